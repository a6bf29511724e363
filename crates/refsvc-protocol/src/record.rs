//! Records nested inside responses.
//!
//! Text fields that git does not constrain (names, emails, messages, ref
//! names) are raw bytes. Dates are seconds since the UNIX epoch.

use serde::{Deserialize, Serialize};

/// Author, committer, or tagger of an object.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitAuthor {
    pub name: Vec<u8>,
    pub email: Vec<u8>,
    pub date_seconds: i64,
}

/// A complete commit object.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FullCommitRecord {
    pub id: String,
    pub subject: Vec<u8>,
    /// Message body, possibly truncated by the backend.
    pub body: Vec<u8>,
    /// Size of the complete body.
    pub body_size: i64,
    pub parent_ids: Vec<String>,
    pub author: Option<CommitAuthor>,
    pub committer: Option<CommitAuthor>,
}

/// A branch with its full target commit.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchRecord {
    /// Branch name, short or fully qualified depending on the method.
    pub name: Vec<u8>,
    pub target_commit: Option<FullCommitRecord>,
}

/// A local branch carrying only subject-line commit metadata.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialCommitRecord {
    pub name: Vec<u8>,
    pub commit_id: String,
    pub commit_subject: Vec<u8>,
    pub commit_author: Option<CommitAuthor>,
    pub commit_committer: Option<CommitAuthor>,
}

/// A tag. Annotated tags carry a message and tagger.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRecord {
    pub name: Vec<u8>,
    /// Id of the tag object (or of the commit for lightweight tags).
    pub id: String,
    pub target_commit: Option<FullCommitRecord>,
    pub message: Vec<u8>,
    pub message_size: i64,
    pub tagger: Option<CommitAuthor>,
}
