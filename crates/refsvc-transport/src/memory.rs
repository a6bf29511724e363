//! In-process reference service for tests and ephemeral use.
//!
//! [`MemoryBackend`] answers every [`Method`] from refs and commits held in
//! memory behind a `RwLock`. It follows the same contract as the real backend,
//! including the failure cases:
//!
//! - malformed ref names in `RefExists` and `DeleteBranch` fail with
//!   [`StatusCode::InvalidArgument`]
//! - `DeleteBranch` on a missing branch fails with [`StatusCode::NotFound`]
//! - `CreateBranch` reports semantic rejections through its status field,
//!   never as a transport error
//!
//! Streaming calls are chunked by [`MemoryBackend::with_chunk_size`].

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use refsvc_protocol::{
    BranchRecord, CommitAuthor, CreateBranchStatus, FullCommitRecord, Method,
    PartialCommitRecord, RefRequest, RefResponse, TagRecord,
};
use refsvc_types::{check_ref_format, SortKey, BRANCH_PREFIX, TAG_PREFIX};
use tracing::trace;

use crate::error::{StatusCode, TransportError, TransportResult};
use crate::options::CallOptions;
use crate::transport::{ResponseStream, Transport};

const DEFAULT_CHUNK_SIZE: usize = 20;

#[derive(Clone, Debug)]
struct Annotation {
    tag_id: String,
    message: Vec<u8>,
    tagger: Option<CommitAuthor>,
}

#[derive(Debug, Default)]
struct State {
    /// Fully-qualified ref name to commit id.
    refs: BTreeMap<Vec<u8>, String>,
    commits: HashMap<String, FullCommitRecord>,
    /// Annotations keyed by fully-qualified tag name.
    annotations: HashMap<Vec<u8>, Annotation>,
    default_branch: Option<Vec<u8>>,
    unavailable: bool,
}

/// An in-memory implementation of the reference service.
#[derive(Debug)]
pub struct MemoryBackend {
    storage_name: String,
    chunk_size: usize,
    state: RwLock<State>,
}

impl MemoryBackend {
    /// Create an empty backend serving `storage_name`.
    pub fn new(storage_name: impl Into<String>) -> Self {
        Self {
            storage_name: storage_name.into(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            state: RwLock::new(State::default()),
        }
    }

    /// Number of records per streamed chunk. Zero is treated as one.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    // ---- Seeding ----

    pub fn add_commit(&self, commit: FullCommitRecord) -> TransportResult<()> {
        self.write()?.commits.insert(commit.id.clone(), commit);
        Ok(())
    }

    /// Point a fully-qualified ref at a commit.
    pub fn set_ref(&self, name: impl AsRef<[u8]>, commit_id: impl Into<String>) -> TransportResult<()> {
        self.write()?.refs.insert(name.as_ref().to_vec(), commit_id.into());
        Ok(())
    }

    /// Create an annotated tag `refs/tags/{name}`.
    pub fn add_annotated_tag(
        &self,
        name: &str,
        commit_id: impl Into<String>,
        tag_id: impl Into<String>,
        message: impl Into<Vec<u8>>,
        tagger: Option<CommitAuthor>,
    ) -> TransportResult<()> {
        let full = qualify(name.as_bytes(), TAG_PREFIX);
        let mut state = self.write()?;
        state.refs.insert(full.clone(), commit_id.into());
        state.annotations.insert(
            full,
            Annotation {
                tag_id: tag_id.into(),
                message: message.into(),
                tagger,
            },
        );
        Ok(())
    }

    /// Set the branch HEAD points at (short or fully-qualified).
    pub fn set_default_branch(&self, name: impl AsRef<[u8]>) -> TransportResult<()> {
        self.write()?.default_branch = Some(qualify(name.as_ref(), BRANCH_PREFIX));
        Ok(())
    }

    /// Make every subsequent call fail with [`StatusCode::Unavailable`].
    pub fn set_unavailable(&self, unavailable: bool) -> TransportResult<()> {
        self.write()?.unavailable = unavailable;
        Ok(())
    }

    fn read(&self) -> TransportResult<RwLockReadGuard<'_, State>> {
        self.state
            .read()
            .map_err(|e| TransportError::internal(format!("lock poisoned: {e}")))
    }

    fn write(&self) -> TransportResult<RwLockWriteGuard<'_, State>> {
        self.state
            .write()
            .map_err(|e| TransportError::internal(format!("lock poisoned: {e}")))
    }

    fn check_route(
        &self,
        storage: &str,
        method: Method,
        request: &RefRequest,
        streaming: bool,
    ) -> TransportResult<()> {
        if self.read()?.unavailable {
            return Err(TransportError::unavailable("backend unavailable"));
        }
        if storage != self.storage_name || request.repository().storage_name != self.storage_name {
            return Err(TransportError::not_found(format!("storage not found: {storage}")));
        }
        if request.method() != method {
            return Err(TransportError::internal(format!(
                "request for {} sent to {method}",
                request.method()
            )));
        }
        if method.is_server_streaming() != streaming {
            let kind = if streaming { "unary" } else { "streaming" };
            return Err(TransportError::new(
                StatusCode::Unimplemented,
                format!("{method} is a {kind} method"),
            ));
        }
        Ok(())
    }

    fn chunked<T, F>(&self, items: Vec<T>, wrap: F) -> Vec<RefResponse>
    where
        T: Clone,
        F: Fn(Vec<T>) -> RefResponse,
    {
        items.chunks(self.chunk_size).map(|c| wrap(c.to_vec())).collect()
    }

    fn answer_unary(&self, request: RefRequest) -> TransportResult<RefResponse> {
        match request {
            RefRequest::FindDefaultBranchName { .. } => {
                let state = self.read()?;
                let name = state
                    .default_branch
                    .clone()
                    .or_else(|| state.branches().next().map(|(n, _)| n.clone()))
                    .unwrap_or_default();
                Ok(RefResponse::DefaultBranchName { name })
            }
            RefRequest::FindRefName { commit_id, prefix, .. } => {
                let state = self.read()?;
                let name = state
                    .refs
                    .iter()
                    .filter(|(n, _)| n.starts_with(&prefix))
                    .find(|(_, tip)| state.reaches(tip, &commit_id))
                    .map(|(n, _)| n.clone())
                    .unwrap_or_default();
                Ok(RefResponse::RefName { name })
            }
            RefRequest::RefExists { ref_name, .. } => {
                if !ref_name.starts_with(b"refs/") {
                    return Err(TransportError::invalid_argument("invalid refname"));
                }
                check_ref_format(&ref_name)
                    .map_err(|e| TransportError::invalid_argument(e.to_string()))?;
                let value = self.read()?.refs.contains_key(&ref_name);
                Ok(RefResponse::RefExists { value })
            }
            RefRequest::FindBranch { name, .. } => {
                let state = self.read()?;
                let full = qualify(&name, BRANCH_PREFIX);
                let branch = state.refs.get(&full).map(|id| BranchRecord {
                    name: strip(&full, BRANCH_PREFIX),
                    target_commit: state.commits.get(id).cloned(),
                });
                Ok(RefResponse::FindBranch { branch })
            }
            RefRequest::CreateBranch { name, start_point, .. } => {
                let mut state = self.write()?;
                let full = qualify(&name, BRANCH_PREFIX);
                let status = if check_ref_format(&full).is_err() {
                    CreateBranchStatus::ErrInvalid
                } else if state.refs.contains_key(&full) {
                    CreateBranchStatus::ErrExists
                } else {
                    match state.resolve(&start_point) {
                        Some(id) => {
                            state.refs.insert(full.clone(), id.clone());
                            let branch = BranchRecord {
                                name: strip(&full, BRANCH_PREFIX),
                                target_commit: state.commits.get(&id).cloned(),
                            };
                            return Ok(RefResponse::CreateBranch {
                                status: CreateBranchStatus::Ok.wire_value(),
                                branch: Some(branch),
                            });
                        }
                        None => CreateBranchStatus::ErrInvalidStartPoint,
                    }
                };
                Ok(RefResponse::CreateBranch { status: status.wire_value(), branch: None })
            }
            RefRequest::DeleteBranch { name, .. } => {
                let full = qualify(&name, BRANCH_PREFIX);
                check_ref_format(&full)
                    .map_err(|e| TransportError::invalid_argument(e.to_string()))?;
                let mut state = self.write()?;
                if state.refs.remove(&full).is_none() {
                    return Err(TransportError::not_found(format!(
                        "branch not found: {}",
                        String::from_utf8_lossy(&name)
                    )));
                }
                Ok(RefResponse::DeleteBranch)
            }
            RefRequest::FindTag { tag_name, .. } => {
                let state = self.read()?;
                let full = qualify(&tag_name, TAG_PREFIX);
                let tag = state.refs.get(&full).map(|id| state.tag_record(&full, id));
                Ok(RefResponse::FindTag { tag })
            }
            other => Err(TransportError::new(
                StatusCode::Unimplemented,
                format!("{} is a streaming method", other.method()),
            )),
        }
    }

    fn answer_stream(&self, request: RefRequest) -> TransportResult<Vec<RefResponse>> {
        let state = self.read()?;
        let names = |prefix: &str| -> Vec<Vec<u8>> {
            state
                .refs
                .keys()
                .filter(|n| n.starts_with(prefix.as_bytes()))
                .cloned()
                .collect()
        };
        let chunks = match request {
            RefRequest::FindAllBranchNames { .. } => {
                self.chunked(names(BRANCH_PREFIX), |names| RefResponse::Names { names })
            }
            RefRequest::FindAllTagNames { .. } => {
                self.chunked(names(TAG_PREFIX), |names| RefResponse::Names { names })
            }
            RefRequest::FindAllBranches { .. } => {
                let branches: Vec<BranchRecord> = state
                    .branches()
                    .map(|(name, id)| BranchRecord {
                        name: name.clone(),
                        target_commit: state.commits.get(id).cloned(),
                    })
                    .collect();
                self.chunked(branches, |branches| RefResponse::AllBranches { branches })
            }
            RefRequest::FindLocalBranches { sort_by, .. } => {
                let key = match sort_by {
                    None => SortKey::Name,
                    Some(v) => SortKey::from_wire(v).ok_or_else(|| {
                        TransportError::invalid_argument(format!("unknown sort_by value {v}"))
                    })?,
                };
                let mut branches: Vec<PartialCommitRecord> = state
                    .branches()
                    .map(|(name, id)| state.local_branch_record(name, id))
                    .collect();
                if key != SortKey::Name {
                    let date = |b: &PartialCommitRecord| {
                        b.commit_committer.as_ref().map(|c| c.date_seconds).unwrap_or(0)
                    };
                    branches.sort_by_key(date);
                    if key == SortKey::UpdatedDesc {
                        branches.reverse();
                    }
                }
                self.chunked(branches, |branches| RefResponse::LocalBranches { branches })
            }
            RefRequest::FindAllTags { .. } => {
                let tags: Vec<TagRecord> = state
                    .refs
                    .iter()
                    .filter(|(n, _)| n.starts_with(TAG_PREFIX.as_bytes()))
                    .map(|(n, id)| state.tag_record(n, id))
                    .collect();
                self.chunked(tags, |tags| RefResponse::Tags { tags })
            }
            RefRequest::ListBranchNamesContainingCommit { commit_id, limit, .. } => {
                let found = state.containing(BRANCH_PREFIX, &commit_id, limit);
                self.chunked(found, |names| RefResponse::Names { names })
            }
            RefRequest::ListTagNamesContainingCommit { commit_id, limit, .. } => {
                let found = state.containing(TAG_PREFIX, &commit_id, limit);
                self.chunked(found, |names| RefResponse::Names { names })
            }
            other => {
                return Err(TransportError::new(
                    StatusCode::Unimplemented,
                    format!("{} is a unary method", other.method()),
                ))
            }
        };
        Ok(chunks)
    }
}

impl State {
    fn branches(&self) -> impl Iterator<Item = (&Vec<u8>, &String)> {
        self.refs
            .iter()
            .filter(|(n, _)| n.starts_with(BRANCH_PREFIX.as_bytes()))
    }

    /// Resolve a start point given as a branch, a full ref, or a commit id.
    fn resolve(&self, rev: &[u8]) -> Option<String> {
        if let Some(id) = self.refs.get(rev) {
            return Some(id.clone());
        }
        if let Some(id) = self.refs.get(&qualify(rev, BRANCH_PREFIX)) {
            return Some(id.clone());
        }
        let id = String::from_utf8_lossy(rev);
        self.commits.contains_key(&*id).then(|| id.into_owned())
    }

    /// Returns `true` if `target` is `tip` or one of its ancestors.
    fn reaches(&self, tip: &str, target: &str) -> bool {
        let mut seen = HashSet::new();
        let mut pending = vec![tip.to_string()];
        while let Some(id) = pending.pop() {
            if id == target {
                return true;
            }
            if !seen.insert(id.clone()) {
                continue;
            }
            if let Some(commit) = self.commits.get(&id) {
                pending.extend(commit.parent_ids.iter().cloned());
            }
        }
        false
    }

    fn containing(&self, prefix: &str, commit_id: &str, limit: u32) -> Vec<Vec<u8>> {
        let limit = if limit == 0 { usize::MAX } else { limit as usize };
        self.refs
            .iter()
            .filter(|(n, _)| n.starts_with(prefix.as_bytes()))
            .filter(|(_, tip)| self.reaches(tip, commit_id))
            .map(|(n, _)| n.clone())
            .take(limit)
            .collect()
    }

    fn local_branch_record(&self, name: &[u8], id: &str) -> PartialCommitRecord {
        let commit = self.commits.get(id);
        PartialCommitRecord {
            name: name.to_vec(),
            commit_id: id.to_string(),
            commit_subject: commit.map(|c| c.subject.clone()).unwrap_or_default(),
            commit_author: commit.and_then(|c| c.author.clone()),
            commit_committer: commit.and_then(|c| c.committer.clone()),
        }
    }

    fn tag_record(&self, full_name: &[u8], commit_id: &str) -> TagRecord {
        let annotation = self.annotations.get(full_name);
        let message = annotation.map(|a| a.message.clone()).unwrap_or_default();
        TagRecord {
            name: strip(full_name, TAG_PREFIX),
            id: annotation
                .map(|a| a.tag_id.clone())
                .unwrap_or_else(|| commit_id.to_string()),
            target_commit: self.commits.get(commit_id).cloned(),
            message_size: message.len() as i64,
            message,
            tagger: annotation.and_then(|a| a.tagger.clone()),
        }
    }
}

fn qualify(name: &[u8], prefix: &str) -> Vec<u8> {
    if name.starts_with(prefix.as_bytes()) {
        return name.to_vec();
    }
    let mut full = prefix.as_bytes().to_vec();
    full.extend_from_slice(name);
    full
}

fn strip(name: &[u8], prefix: &str) -> Vec<u8> {
    name.strip_prefix(prefix.as_bytes()).unwrap_or(name).to_vec()
}

#[async_trait]
impl Transport for MemoryBackend {
    async fn unary(
        &self,
        storage: &str,
        method: Method,
        request: RefRequest,
        _options: &CallOptions,
    ) -> TransportResult<RefResponse> {
        self.check_route(storage, method, &request, false)?;
        trace!(path = %method.path(), "memory backend unary call");
        self.answer_unary(request)
    }

    async fn server_streaming(
        &self,
        storage: &str,
        method: Method,
        request: RefRequest,
        _options: &CallOptions,
    ) -> TransportResult<ResponseStream> {
        self.check_route(storage, method, &request, true)?;
        let chunks = self.answer_stream(request)?;
        trace!(path = %method.path(), chunks = chunks.len(), "memory backend streaming call");
        Ok(stream::iter(chunks.into_iter().map(Ok)).boxed())
    }
}
