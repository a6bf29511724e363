//! Branches and tags as seen through the reference service.
//!
//! Names are always short names: `refs/heads/` and `refs/tags/` are stripped
//! before these values are built.

use serde::{Deserialize, Serialize};

use crate::commit::{Commit, PartialCommit, Signature};
use crate::names::RefName;

/// The commit a branch points at, in whatever detail the call provided.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BranchCommit {
    /// Full commit object (find/create/list-all calls).
    Full(Commit),
    /// Subject-only metadata (local branch listings).
    Partial(PartialCommit),
    /// The backend sent no commit object.
    Missing,
}

impl BranchCommit {
    pub fn id(&self) -> Option<&str> {
        match self {
            BranchCommit::Full(c) => Some(&c.id),
            BranchCommit::Partial(c) => Some(&c.id),
            BranchCommit::Missing => None,
        }
    }

    /// The commit message as far as it is known. For partial commits this is
    /// only the subject line.
    pub fn message(&self) -> Option<&str> {
        match self {
            BranchCommit::Full(c) => Some(&c.message),
            BranchCommit::Partial(c) => Some(&c.message),
            BranchCommit::Missing => None,
        }
    }

    pub fn is_partial(&self) -> bool {
        matches!(self, BranchCommit::Partial(_))
    }
}

/// A branch and the commit it points at.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    pub name: RefName,
    pub target_commit_id: String,
    pub commit: BranchCommit,
}

/// A tag, lightweight or annotated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub name: RefName,
    /// Id of the tag object, or of the commit for lightweight tags.
    pub id: String,
    /// Id of the commit the tag ultimately resolves to. Empty when the backend
    /// sent no commit for an annotated tag.
    pub target_commit_id: String,
    pub target_commit: Option<Commit>,
    /// Annotation message; empty for lightweight tags.
    pub message: String,
    /// Size of the full annotation on the backend, in bytes.
    pub message_size: u64,
    /// Bytes of the annotation actually received, before UTF-8 coercion.
    pub message_received: u64,
    pub tagger: Option<Signature>,
}

impl Tag {
    pub fn is_annotated(&self) -> bool {
        self.tagger.is_some() || !self.message.is_empty()
    }

    /// Returns `true` if the backend sent less of the annotation than exists.
    pub fn message_truncated(&self) -> bool {
        self.message_size > self.message_received
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commit::time_from_seconds;

    fn partial() -> PartialCommit {
        PartialCommit {
            id: "c0ffee".into(),
            message: "Subject only".into(),
            authored_date: time_from_seconds(10),
            author_name: "a".into(),
            author_email: "a@x".into(),
            committed_date: time_from_seconds(20),
            committer_name: "c".into(),
            committer_email: "c@x".into(),
        }
    }

    #[test]
    fn branch_commit_accessors() {
        let c = BranchCommit::Partial(partial());
        assert_eq!(c.id(), Some("c0ffee"));
        assert_eq!(c.message(), Some("Subject only"));
        assert!(c.is_partial());
        assert_eq!(BranchCommit::Missing.id(), None);
    }

    #[test]
    fn lightweight_tag_is_not_annotated() {
        let tag = Tag {
            name: RefName::from("v1"),
            id: "c0ffee".into(),
            target_commit_id: "c0ffee".into(),
            target_commit: None,
            message: String::new(),
            message_size: 0,
            message_received: 0,
            tagger: None,
        };
        assert!(!tag.is_annotated());
        assert!(!tag.message_truncated());
    }

    #[test]
    fn annotated_tag_truncation() {
        let tag = Tag {
            name: RefName::from("v2"),
            id: "7a9".into(),
            target_commit_id: "c0ffee".into(),
            target_commit: None,
            message: "Release".into(),
            message_size: 10_000,
            message_received: 7,
            tagger: Some(Signature {
                name: "t".into(),
                email: "t@x".into(),
                date: time_from_seconds(0),
            }),
        };
        assert!(tag.is_annotated());
        assert!(tag.message_truncated());
    }
}
