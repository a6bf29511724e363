use refsvc_types::RepositoryHandle;
use serde::{Deserialize, Serialize};

use crate::method::Method;
use crate::record::{BranchRecord, PartialCommitRecord, TagRecord};

/// Every request the client sends to the reference service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RefRequest {
    FindDefaultBranchName { repository: RepositoryHandle },
    FindAllBranchNames { repository: RepositoryHandle },
    FindAllTagNames { repository: RepositoryHandle },
    FindRefName { repository: RepositoryHandle, commit_id: String, prefix: Vec<u8> },
    /// `sort_by` of `None` leaves ordering to the backend.
    FindLocalBranches { repository: RepositoryHandle, sort_by: Option<i32> },
    FindAllBranches { repository: RepositoryHandle },
    FindAllTags { repository: RepositoryHandle },
    RefExists { repository: RepositoryHandle, ref_name: Vec<u8> },
    FindBranch { repository: RepositoryHandle, name: Vec<u8> },
    CreateBranch { repository: RepositoryHandle, name: Vec<u8>, start_point: Vec<u8> },
    DeleteBranch { repository: RepositoryHandle, name: Vec<u8> },
    FindTag { repository: RepositoryHandle, tag_name: Vec<u8> },
    /// `limit` of 0 means no limit.
    ListBranchNamesContainingCommit { repository: RepositoryHandle, commit_id: String, limit: u32 },
    ListTagNamesContainingCommit { repository: RepositoryHandle, commit_id: String, limit: u32 },
}

impl RefRequest {
    pub fn method(&self) -> Method {
        match self {
            Self::FindDefaultBranchName { .. } => Method::FindDefaultBranchName,
            Self::FindAllBranchNames { .. } => Method::FindAllBranchNames,
            Self::FindAllTagNames { .. } => Method::FindAllTagNames,
            Self::FindRefName { .. } => Method::FindRefName,
            Self::FindLocalBranches { .. } => Method::FindLocalBranches,
            Self::FindAllBranches { .. } => Method::FindAllBranches,
            Self::FindAllTags { .. } => Method::FindAllTags,
            Self::RefExists { .. } => Method::RefExists,
            Self::FindBranch { .. } => Method::FindBranch,
            Self::CreateBranch { .. } => Method::CreateBranch,
            Self::DeleteBranch { .. } => Method::DeleteBranch,
            Self::FindTag { .. } => Method::FindTag,
            Self::ListBranchNamesContainingCommit { .. } => Method::ListBranchNamesContainingCommit,
            Self::ListTagNamesContainingCommit { .. } => Method::ListTagNamesContainingCommit,
        }
    }

    pub fn repository(&self) -> &RepositoryHandle {
        match self {
            Self::FindDefaultBranchName { repository }
            | Self::FindAllBranchNames { repository }
            | Self::FindAllTagNames { repository }
            | Self::FindRefName { repository, .. }
            | Self::FindLocalBranches { repository, .. }
            | Self::FindAllBranches { repository }
            | Self::FindAllTags { repository }
            | Self::RefExists { repository, .. }
            | Self::FindBranch { repository, .. }
            | Self::CreateBranch { repository, .. }
            | Self::DeleteBranch { repository, .. }
            | Self::FindTag { repository, .. }
            | Self::ListBranchNamesContainingCommit { repository, .. }
            | Self::ListTagNamesContainingCommit { repository, .. } => repository,
        }
    }
}

/// Every response (or response chunk) the reference service sends back.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RefResponse {
    DefaultBranchName { name: Vec<u8> },
    /// One chunk of a name listing.
    Names { names: Vec<Vec<u8>> },
    /// Empty `name` when no ref matched.
    RefName { name: Vec<u8> },
    LocalBranches { branches: Vec<PartialCommitRecord> },
    AllBranches { branches: Vec<BranchRecord> },
    Tags { tags: Vec<TagRecord> },
    RefExists { value: bool },
    FindBranch { branch: Option<BranchRecord> },
    /// `status` is the raw wire value, see [`CreateBranchStatus`].
    CreateBranch { status: i32, branch: Option<BranchRecord> },
    DeleteBranch,
    FindTag { tag: Option<TagRecord> },
}

impl RefResponse {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::DefaultBranchName { .. } => "DefaultBranchName",
            Self::Names { .. } => "Names",
            Self::RefName { .. } => "RefName",
            Self::LocalBranches { .. } => "LocalBranches",
            Self::AllBranches { .. } => "AllBranches",
            Self::Tags { .. } => "Tags",
            Self::RefExists { .. } => "RefExists",
            Self::FindBranch { .. } => "FindBranch",
            Self::CreateBranch { .. } => "CreateBranch",
            Self::DeleteBranch => "DeleteBranch",
            Self::FindTag { .. } => "FindTag",
        }
    }
}

/// Outcome of a create-branch call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CreateBranchStatus {
    Ok,
    ErrExists,
    ErrInvalid,
    ErrInvalidStartPoint,
}

impl CreateBranchStatus {
    pub fn wire_value(&self) -> i32 {
        match self {
            Self::Ok => 0,
            Self::ErrExists => 1,
            Self::ErrInvalid => 2,
            Self::ErrInvalidStartPoint => 3,
        }
    }

    /// Returns `None` for values outside the known enumeration.
    pub fn from_wire(value: i32) -> Option<Self> {
        match value {
            0 => Some(Self::Ok),
            1 => Some(Self::ErrExists),
            2 => Some(Self::ErrInvalid),
            3 => Some(Self::ErrInvalidStartPoint),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo() -> RepositoryHandle {
        RepositoryHandle::new("default", "group/project.git", "project-1").unwrap()
    }

    #[test]
    fn request_method_matches_variant() {
        let req = RefRequest::CreateBranch {
            repository: repo(),
            name: b"feature".to_vec(),
            start_point: b"main".to_vec(),
        };
        assert_eq!(req.method(), Method::CreateBranch);
        assert_eq!(req.repository(), &repo());

        let req = RefRequest::FindLocalBranches { repository: repo(), sort_by: None };
        assert_eq!(req.method(), Method::FindLocalBranches);
    }

    #[test]
    fn status_wire_values() {
        for status in [
            CreateBranchStatus::Ok,
            CreateBranchStatus::ErrExists,
            CreateBranchStatus::ErrInvalid,
            CreateBranchStatus::ErrInvalidStartPoint,
        ] {
            assert_eq!(CreateBranchStatus::from_wire(status.wire_value()), Some(status));
        }
    }

    #[test]
    fn unknown_status_is_none() {
        assert_eq!(CreateBranchStatus::from_wire(4), None);
        assert_eq!(CreateBranchStatus::from_wire(-1), None);
    }

    #[test]
    fn response_type_names() {
        assert_eq!(RefResponse::DeleteBranch.type_name(), "DeleteBranch");
        assert_eq!(RefResponse::Names { names: vec![] }.type_name(), "Names");
    }

    #[test]
    fn request_serializes_with_repository() {
        let req = RefRequest::RefExists { repository: repo(), ref_name: b"refs/heads/main".to_vec() };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["RefExists"]["repository"]["storage_name"], "default");
    }
}
