use futures::TryStreamExt;
use refsvc_protocol::{CreateBranchStatus, Method, ProtocolError, RefRequest, RefResponse};
use refsvc_transport::{CallOptions, Transport};
use refsvc_types::{branch_name, tag_name, Branch, RefName, RepositoryHandle, SortKey, Tag};
use tracing::debug;

use crate::config::{ClientConfig, ConfigError};
use crate::decode::{self, unexpected, DecodedStream};
use crate::error::{ClientError, ClientResult};

/// Client for the remote reference service, bound to one repository.
///
/// Safe to share between tasks: every operation is an independent round trip
/// and the client keeps no state between calls.
pub struct RefClient<T> {
    transport: T,
    repository: RepositoryHandle,
    options: CallOptions,
}

impl<T: Transport> RefClient<T> {
    pub fn new(transport: T, repository: RepositoryHandle) -> Self {
        Self {
            transport,
            repository,
            options: CallOptions::default(),
        }
    }

    /// Build a client from loaded settings.
    pub fn from_config(transport: T, config: &ClientConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(transport, config.repository()?).with_call_options(config.call_options()))
    }

    /// Options passed to the transport on every call.
    pub fn with_call_options(mut self, options: CallOptions) -> Self {
        self.options = options;
        self
    }

    pub fn repository(&self) -> &RepositoryHandle {
        &self.repository
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn repo(&self) -> RepositoryHandle {
        self.repository.clone()
    }

    async fn unary(&self, request: RefRequest) -> ClientResult<RefResponse> {
        let method = request.method();
        debug!(
            repository = %self.repository,
            %method,
            mutator = method.is_mutator(),
            "reference service call"
        );
        let response = self
            .transport
            .unary(&self.repository.storage_name, method, request, &self.options)
            .await?;
        Ok(response)
    }

    async fn streaming(&self, request: RefRequest) -> ClientResult<refsvc_transport::ResponseStream> {
        let method = request.method();
        debug!(repository = %self.repository, %method, "reference service stream");
        let stream = self
            .transport
            .server_streaming(&self.repository.storage_name, method, request, &self.options)
            .await?;
        Ok(stream)
    }

    // ---- Branch listings ----

    /// All branches with their full target commits, in backend order.
    pub async fn list_branches(&self) -> ClientResult<Vec<Branch>> {
        let method = Method::FindAllBranches;
        let chunks = self.streaming(RefRequest::FindAllBranches { repository: self.repo() }).await?;
        decode::flatten_chunks(chunks, method, |response| match response {
            RefResponse::AllBranches { branches } => {
                Some(branches.into_iter().map(decode::decode_branch).collect())
            }
            _ => None,
        })
        .try_collect()
        .await
    }

    /// Local branches with subject-only commit metadata.
    ///
    /// `sort_by` is resolved with [`SortKey::resolve`] before anything is sent;
    /// an unknown key fails with [`ClientError::InvalidArgument`]. `None`
    /// leaves the ordering to the backend.
    pub async fn local_branches(&self, sort_by: Option<&str>) -> ClientResult<Vec<Branch>> {
        let sort_by = sort_by.map(SortKey::resolve).transpose()?;
        let method = Method::FindLocalBranches;
        let chunks = self
            .streaming(RefRequest::FindLocalBranches {
                repository: self.repo(),
                sort_by: sort_by.map(|k| k.wire_value()),
            })
            .await?;
        decode::flatten_chunks(chunks, method, |response| match response {
            RefResponse::LocalBranches { branches } => {
                Some(branches.into_iter().map(decode::decode_local_branch).collect())
            }
            _ => None,
        })
        .try_collect()
        .await
    }

    pub async fn default_branch_name(&self) -> ClientResult<RefName> {
        let method = Method::FindDefaultBranchName;
        match self.unary(RefRequest::FindDefaultBranchName { repository: self.repo() }).await? {
            RefResponse::DefaultBranchName { name } => Ok(branch_name(&name)),
            other => Err(unexpected(method, other.type_name())),
        }
    }

    // ---- Name listings ----

    /// Branch names as they arrive, without commit payloads.
    pub async fn branch_names_stream(&self) -> ClientResult<DecodedStream<RefName>> {
        let method = Method::FindAllBranchNames;
        let chunks = self.streaming(RefRequest::FindAllBranchNames { repository: self.repo() }).await?;
        Ok(decode::decode_names(chunks, method, branch_name))
    }

    /// Tag names as they arrive, without commit payloads.
    pub async fn tag_names_stream(&self) -> ClientResult<DecodedStream<RefName>> {
        let method = Method::FindAllTagNames;
        let chunks = self.streaming(RefRequest::FindAllTagNames { repository: self.repo() }).await?;
        Ok(decode::decode_names(chunks, method, tag_name))
    }

    pub async fn list_branch_names(&self) -> ClientResult<Vec<RefName>> {
        self.branch_names_stream().await?.try_collect().await
    }

    pub async fn list_tag_names(&self) -> ClientResult<Vec<RefName>> {
        self.tag_names_stream().await?.try_collect().await
    }

    /// Number of branches. Materializes the full name listing; there is no
    /// dedicated count call.
    pub async fn count_branch_names(&self) -> ClientResult<usize> {
        Ok(self.list_branch_names().await?.len())
    }

    /// Number of tags. Materializes the full name listing.
    pub async fn count_tag_names(&self) -> ClientResult<usize> {
        Ok(self.list_tag_names().await?.len())
    }

    /// Names of branches whose history contains `commit_id`. A `limit` of 0
    /// returns all of them.
    pub async fn branch_names_containing(&self, commit_id: &str, limit: u32) -> ClientResult<Vec<RefName>> {
        let method = Method::ListBranchNamesContainingCommit;
        let chunks = self
            .streaming(RefRequest::ListBranchNamesContainingCommit {
                repository: self.repo(),
                commit_id: commit_id.to_string(),
                limit,
            })
            .await?;
        decode::decode_names(chunks, method, branch_name).try_collect().await
    }

    /// Names of tags whose history contains `commit_id`.
    pub async fn tag_names_containing(&self, commit_id: &str, limit: u32) -> ClientResult<Vec<RefName>> {
        let method = Method::ListTagNamesContainingCommit;
        let chunks = self
            .streaming(RefRequest::ListTagNamesContainingCommit {
                repository: self.repo(),
                commit_id: commit_id.to_string(),
                limit,
            })
            .await?;
        decode::decode_names(chunks, method, tag_name).try_collect().await
    }

    // ---- Lookups ----

    /// First ref under `ref_prefix` that reaches `commit_id`. Empty when none
    /// does. The name is encoding-normalized.
    pub async fn find_ref_name(&self, commit_id: &str, ref_prefix: &str) -> ClientResult<RefName> {
        let method = Method::FindRefName;
        let request = RefRequest::FindRefName {
            repository: self.repo(),
            commit_id: commit_id.to_string(),
            prefix: ref_prefix.as_bytes().to_vec(),
        };
        match self.unary(request).await? {
            RefResponse::RefName { name } => Ok(decode::normalize_ref_name(&name)),
            other => Err(unexpected(method, other.type_name())),
        }
    }

    /// Whether a fully-qualified ref exists.
    ///
    /// A backend `InvalidArgument` means the name itself is malformed and is
    /// reported as [`ClientError::InvalidArgument`].
    pub async fn ref_exists(&self, ref_name: impl AsRef<[u8]>) -> ClientResult<bool> {
        let method = Method::RefExists;
        let request = RefRequest::RefExists {
            repository: self.repo(),
            ref_name: ref_name.as_ref().to_vec(),
        };
        match self.unary(request).await {
            Ok(RefResponse::RefExists { value }) => Ok(value),
            Ok(other) => Err(unexpected(method, other.type_name())),
            Err(ClientError::Backend(e)) if e.is_invalid_argument() => {
                Err(ClientError::InvalidArgument(e.message))
            }
            Err(e) => Err(e),
        }
    }

    /// Look up a branch. `Ok(None)` means it does not exist.
    pub async fn find_branch(&self, branch_name: impl AsRef<[u8]>) -> ClientResult<Option<Branch>> {
        let method = Method::FindBranch;
        let request = RefRequest::FindBranch {
            repository: self.repo(),
            name: branch_name.as_ref().to_vec(),
        };
        match self.unary(request).await? {
            RefResponse::FindBranch { branch } => Ok(branch.map(decode::decode_branch)),
            other => Err(unexpected(method, other.type_name())),
        }
    }

    /// Look up a tag. `Ok(None)` means it does not exist.
    pub async fn find_tag(&self, tag_name: impl AsRef<[u8]>) -> ClientResult<Option<Tag>> {
        let method = Method::FindTag;
        let request = RefRequest::FindTag {
            repository: self.repo(),
            tag_name: tag_name.as_ref().to_vec(),
        };
        match self.unary(request).await? {
            RefResponse::FindTag { tag } => Ok(tag.map(decode::decode_tag)),
            other => Err(unexpected(method, other.type_name())),
        }
    }

    /// All tags, in backend order.
    pub async fn tags(&self) -> ClientResult<Vec<Tag>> {
        let method = Method::FindAllTags;
        let chunks = self.streaming(RefRequest::FindAllTags { repository: self.repo() }).await?;
        decode::flatten_chunks(chunks, method, |response| match response {
            RefResponse::Tags { tags } => Some(tags.into_iter().map(decode::decode_tag).collect()),
            _ => None,
        })
        .try_collect()
        .await
    }

    // ---- Mutations ----

    /// Create `ref_name` at `start_point`.
    ///
    /// Rejections come back as [`ClientError::InvalidRef`]. A status outside
    /// the known set is a [`ClientError::ProtocolMismatch`], never a success.
    pub async fn create_branch(&self, ref_name: &str, start_point: &str) -> ClientResult<Branch> {
        let method = Method::CreateBranch;
        let request = RefRequest::CreateBranch {
            repository: self.repo(),
            name: ref_name.as_bytes().to_vec(),
            start_point: start_point.as_bytes().to_vec(),
        };
        let (status, branch) = match self.unary(request).await? {
            RefResponse::CreateBranch { status, branch } => (status, branch),
            other => return Err(unexpected(method, other.type_name())),
        };
        match CreateBranchStatus::from_wire(status) {
            Some(CreateBranchStatus::Ok) => {
                let branch = branch.ok_or(ProtocolError::MissingField {
                    method: method.name(),
                    field: "branch",
                })?;
                Ok(decode::decode_branch(branch))
            }
            Some(CreateBranchStatus::ErrInvalid) => {
                Err(ClientError::InvalidRef("Invalid ref name".into()))
            }
            Some(CreateBranchStatus::ErrExists) => {
                Err(ClientError::InvalidRef(format!("Branch {ref_name} already exists")))
            }
            Some(CreateBranchStatus::ErrInvalidStartPoint) => {
                Err(ClientError::InvalidRef(format!("Invalid reference {start_point}")))
            }
            None => Err(ProtocolError::UnknownStatus {
                method: method.name(),
                value: status,
            }
            .into()),
        }
    }

    /// Delete a branch. Whatever error the backend reports, including for a
    /// branch that does not exist, is returned as is.
    pub async fn delete_branch(&self, ref_name: impl AsRef<[u8]>) -> ClientResult<()> {
        let method = Method::DeleteBranch;
        let request = RefRequest::DeleteBranch {
            repository: self.repo(),
            name: ref_name.as_ref().to_vec(),
        };
        match self.unary(request).await? {
            RefResponse::DeleteBranch => Ok(()),
            other => Err(unexpected(method, other.type_name())),
        }
    }
}
