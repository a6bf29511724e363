use std::fmt;

use serde::{Deserialize, Serialize};

/// Fully-qualified service names.
pub mod services {
    pub const REF_SERVICE: &str = "refsvc.RefService";
}

/// Every method the client calls on the reference service.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Method {
    FindDefaultBranchName,
    FindAllBranchNames,
    FindAllTagNames,
    FindRefName,
    FindLocalBranches,
    FindAllBranches,
    FindAllTags,
    RefExists,
    FindBranch,
    CreateBranch,
    DeleteBranch,
    FindTag,
    ListBranchNamesContainingCommit,
    ListTagNamesContainingCommit,
}

impl Method {
    pub const ALL: [Method; 14] = [
        Method::FindDefaultBranchName,
        Method::FindAllBranchNames,
        Method::FindAllTagNames,
        Method::FindRefName,
        Method::FindLocalBranches,
        Method::FindAllBranches,
        Method::FindAllTags,
        Method::RefExists,
        Method::FindBranch,
        Method::CreateBranch,
        Method::DeleteBranch,
        Method::FindTag,
        Method::ListBranchNamesContainingCommit,
        Method::ListTagNamesContainingCommit,
    ];

    pub fn service(&self) -> &'static str {
        services::REF_SERVICE
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::FindDefaultBranchName => "FindDefaultBranchName",
            Self::FindAllBranchNames => "FindAllBranchNames",
            Self::FindAllTagNames => "FindAllTagNames",
            Self::FindRefName => "FindRefName",
            Self::FindLocalBranches => "FindLocalBranches",
            Self::FindAllBranches => "FindAllBranches",
            Self::FindAllTags => "FindAllTags",
            Self::RefExists => "RefExists",
            Self::FindBranch => "FindBranch",
            Self::CreateBranch => "CreateBranch",
            Self::DeleteBranch => "DeleteBranch",
            Self::FindTag => "FindTag",
            Self::ListBranchNamesContainingCommit => "ListBranchNamesContainingCommit",
            Self::ListTagNamesContainingCommit => "ListTagNamesContainingCommit",
        }
    }

    /// Route path, e.g. `/refsvc.RefService/FindBranch`.
    pub fn path(&self) -> String {
        format!("/{}/{}", self.service(), self.name())
    }

    /// Returns `true` if the backend answers with a stream of chunks.
    pub fn is_server_streaming(&self) -> bool {
        matches!(
            self,
            Self::FindAllBranchNames
                | Self::FindAllTagNames
                | Self::FindLocalBranches
                | Self::FindAllBranches
                | Self::FindAllTags
                | Self::ListBranchNamesContainingCommit
                | Self::ListTagNamesContainingCommit
        )
    }

    /// Returns `true` if the call changes repository state.
    pub fn is_mutator(&self) -> bool {
        matches!(self, Self::CreateBranch | Self::DeleteBranch)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_are_unique() {
        let mut paths: Vec<String> = Method::ALL.iter().map(|m| m.path()).collect();
        let len = paths.len();
        paths.sort();
        paths.dedup();
        assert_eq!(paths.len(), len, "method paths should be unique");
    }

    #[test]
    fn path_format() {
        assert_eq!(Method::FindBranch.path(), "/refsvc.RefService/FindBranch");
        assert_eq!(Method::RefExists.to_string(), "RefExists");
    }

    #[test]
    fn streaming_methods() {
        assert!(Method::FindAllBranches.is_server_streaming());
        assert!(Method::FindAllTagNames.is_server_streaming());
        assert!(!Method::FindBranch.is_server_streaming());
        assert!(!Method::CreateBranch.is_server_streaming());
    }

    #[test]
    fn only_branch_writes_mutate() {
        let mutators: Vec<Method> = Method::ALL.into_iter().filter(|m| m.is_mutator()).collect();
        assert_eq!(mutators, vec![Method::CreateBranch, Method::DeleteBranch]);
    }
}
