//! Response decoding: wire records to domain values.
//!
//! Each wire record shape has exactly one decoder, and each client operation
//! picks its decoder statically:
//!
//! | Record | Decoder | Used by |
//! |---|---|---|
//! | [`BranchRecord`] | [`decode_branch`] | all branches, find/create branch |
//! | [`PartialCommitRecord`] | [`decode_local_branch`] | local branches |
//! | [`TagRecord`] | [`decode_tag`] | tags, find tag |
//! | [`FullCommitRecord`] | [`decode_commit`] | nested in the above |
//!
//! Commit messages are coerced to UTF-8 on a best-effort basis. That step is
//! lossy and never fails the call; see [`refsvc_types::text`].

use futures::future;
use futures::stream::{self, BoxStream, StreamExt};
use refsvc_protocol::{
    BranchRecord, CommitAuthor, FullCommitRecord, Method, PartialCommitRecord, ProtocolError,
    RefResponse, TagRecord,
};
use refsvc_transport::ResponseStream;
use refsvc_types::{
    branch_name, coerce_utf8, tag_name, time_from_seconds, Branch, BranchCommit, Commit,
    PartialCommit, RefName, Signature, Tag,
};
use tracing::{debug, trace};

use crate::error::{ClientError, ClientResult};

/// Lazily decoded records of a streaming call.
pub type DecodedStream<T> = BoxStream<'static, ClientResult<T>>;

/// Flatten a stream of response chunks into a stream of records.
///
/// `extract` pulls the records out of one chunk, returning `None` if the chunk
/// is not the shape `method` answers with. Order is preserved: chunk order,
/// then order within a chunk. The stream ends after the first error.
pub fn flatten_chunks<T, F>(chunks: ResponseStream, method: Method, mut extract: F) -> DecodedStream<T>
where
    T: Send + 'static,
    F: FnMut(RefResponse) -> Option<Vec<T>> + Send + 'static,
{
    chunks
        .map(move |chunk| -> ClientResult<Vec<T>> {
            let response = chunk?;
            let got = response.type_name();
            let records = extract(response).ok_or_else(|| unexpected(method, got))?;
            trace!(%method, records = records.len(), "decoded chunk");
            Ok(records)
        })
        .scan(false, |failed, chunk| {
            if *failed {
                return future::ready(None);
            }
            *failed = chunk.is_err();
            future::ready(Some(chunk))
        })
        .flat_map(|chunk| {
            let items: Vec<ClientResult<T>> = match chunk {
                Ok(records) => records.into_iter().map(Ok).collect(),
                Err(e) => vec![Err(e)],
            };
            stream::iter(items)
        })
        .boxed()
}

/// Flatten a name-listing stream, normalizing each name with `transform`.
pub fn decode_names(
    chunks: ResponseStream,
    method: Method,
    transform: fn(&[u8]) -> RefName,
) -> DecodedStream<RefName> {
    flatten_chunks(chunks, method, move |response| match response {
        RefResponse::Names { names } => Some(names.iter().map(|n| transform(n)).collect()),
        _ => None,
    })
}

pub(crate) fn unexpected(method: Method, got: &'static str) -> ClientError {
    ClientError::ProtocolMismatch(ProtocolError::UnexpectedResponse {
        method: method.name(),
        got,
    })
}

/// Best-effort UTF-8 text for display fields, logging when bytes were lost.
fn text(bytes: &[u8], field: &'static str) -> String {
    let coerced = coerce_utf8(bytes);
    if coerced.lossy {
        debug!(field, "replaced invalid UTF-8 in backend response");
    }
    coerced.text
}

/// Encoding-normalize a ref name: invalid UTF-8 is replaced.
pub fn normalize_ref_name(raw: &[u8]) -> RefName {
    RefName::from(text(raw, "ref_name"))
}

pub fn decode_signature(author: Option<&CommitAuthor>) -> Signature {
    match author {
        Some(a) => Signature {
            name: text(&a.name, "author_name"),
            email: text(&a.email, "author_email"),
            date: time_from_seconds(a.date_seconds),
        },
        None => Signature {
            name: String::new(),
            email: String::new(),
            date: time_from_seconds(0),
        },
    }
}

/// Decode a full commit. The message is the body when present, otherwise the
/// subject.
pub fn decode_commit(record: &FullCommitRecord) -> Commit {
    let subject = text(&record.subject, "subject");
    let message = if record.body.is_empty() {
        subject.clone()
    } else {
        text(&record.body, "body")
    };
    Commit {
        id: record.id.clone(),
        subject,
        message,
        body_size: record.body_size.max(0) as u64,
        body_received: record.body.len() as u64,
        parent_ids: record.parent_ids.clone(),
        author: decode_signature(record.author.as_ref()),
        committer: decode_signature(record.committer.as_ref()),
    }
}

/// Synthesize subject-only commit metadata from a local branch record.
pub fn decode_partial_commit(record: &PartialCommitRecord) -> PartialCommit {
    let author = decode_signature(record.commit_author.as_ref());
    let committer = decode_signature(record.commit_committer.as_ref());
    PartialCommit {
        id: record.commit_id.clone(),
        message: text(&record.commit_subject, "commit_subject"),
        authored_date: author.date,
        author_name: author.name,
        author_email: author.email,
        committed_date: committer.date,
        committer_name: committer.name,
        committer_email: committer.email,
    }
}

/// Decode a branch that carries its full target commit.
pub fn decode_branch(record: BranchRecord) -> Branch {
    let (target_commit_id, commit) = match record.target_commit.as_ref() {
        Some(c) => (c.id.clone(), BranchCommit::Full(decode_commit(c))),
        None => (String::new(), BranchCommit::Missing),
    };
    Branch {
        name: branch_name(&record.name),
        target_commit_id,
        commit,
    }
}

/// Decode a local branch listing entry.
pub fn decode_local_branch(record: PartialCommitRecord) -> Branch {
    Branch {
        name: branch_name(&record.name),
        target_commit_id: record.commit_id.clone(),
        commit: BranchCommit::Partial(decode_partial_commit(&record)),
    }
}

/// Decode a tag. A lightweight tag has no tag object, so its id is the commit
/// it points at and stands in when the backend sends no target commit.
pub fn decode_tag(record: TagRecord) -> Tag {
    let target_commit = record.target_commit.as_ref().map(decode_commit);
    let tagger = record.tagger.as_ref().map(|t| decode_signature(Some(t)));
    let lightweight = tagger.is_none() && record.message.is_empty();
    let target_commit_id = match &target_commit {
        Some(c) => c.id.clone(),
        None if lightweight => record.id.clone(),
        None => String::new(),
    };
    Tag {
        name: tag_name(&record.name),
        id: record.id.clone(),
        target_commit_id,
        target_commit,
        message: text(&record.message, "tag_message"),
        message_size: record.message_size.max(0) as u64,
        message_received: record.message.len() as u64,
        tagger,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use futures::TryStreamExt;
    use proptest::prelude::*;
    use refsvc_transport::TransportError;

    fn author(name: &[u8], date: i64) -> CommitAuthor {
        CommitAuthor { name: name.to_vec(), email: b"dev@example.com".to_vec(), date_seconds: date }
    }

    fn names_chunk(names: &[&str]) -> RefResponse {
        RefResponse::Names { names: names.iter().map(|n| n.as_bytes().to_vec()).collect() }
    }

    fn chunks(items: Vec<Result<RefResponse, TransportError>>) -> ResponseStream {
        stream::iter(items).boxed()
    }

    #[test]
    fn names_flatten_in_order_and_strip_prefix() {
        let s = chunks(vec![
            Ok(names_chunk(&["refs/heads/a", "refs/heads/b"])),
            Ok(names_chunk(&[])),
            Ok(names_chunk(&["refs/heads/c"])),
        ]);
        let names: Vec<RefName> =
            block_on(decode_names(s, Method::FindAllBranchNames, branch_name).try_collect()).unwrap();
        let names: Vec<String> = names.iter().map(|n| n.to_string()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn wrong_chunk_shape_is_protocol_mismatch() {
        let s = chunks(vec![Ok(names_chunk(&["refs/tags/v1"])), Ok(RefResponse::RefExists { value: true })]);
        let err = block_on(decode_names(s, Method::FindAllTagNames, tag_name).try_collect::<Vec<_>>())
            .unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn stream_ends_after_first_error() {
        let s = chunks(vec![
            Ok(names_chunk(&["refs/heads/a"])),
            Err(TransportError::unavailable("reset")),
            Ok(names_chunk(&["refs/heads/b"])),
        ]);
        let items: Vec<ClientResult<RefName>> =
            block_on(decode_names(s, Method::FindAllBranchNames, branch_name).collect());
        assert_eq!(items.len(), 2);
        assert!(items[0].is_ok());
        assert!(matches!(items[1], Err(ClientError::Backend(_))));
    }

    #[test]
    fn partial_commit_from_local_branch() {
        let record = PartialCommitRecord {
            name: b"refs/heads/feature".to_vec(),
            commit_id: "abc123".into(),
            commit_subject: b"Add caf\xe9 menu".to_vec(),
            commit_author: Some(author(b"Ada", 1_000)),
            commit_committer: Some(author(b"Grace", 2_000)),
        };
        let branch = decode_local_branch(record);
        assert_eq!(branch.name.to_string(), "feature");
        assert_eq!(branch.target_commit_id, "abc123");
        match branch.commit {
            BranchCommit::Partial(c) => {
                assert_eq!(c.message, "Add caf\u{fffd} menu");
                assert_eq!(c.author_name, "Ada");
                assert_eq!(c.authored_date.timestamp(), 1_000);
                assert_eq!(c.committer_name, "Grace");
                assert_eq!(c.committed_date.timestamp(), 2_000);
            }
            other => panic!("expected partial commit, got {other:?}"),
        }
    }

    #[test]
    fn branch_with_full_commit() {
        let record = BranchRecord {
            name: b"main".to_vec(),
            target_commit: Some(FullCommitRecord {
                id: "c0ffee".into(),
                subject: b"Initial".to_vec(),
                body: b"Initial\n\nLonger body".to_vec(),
                body_size: 20,
                parent_ids: vec![],
                author: Some(author(b"Ada", 5)),
                committer: None,
            }),
        };
        let branch = decode_branch(record);
        assert_eq!(branch.target_commit_id, "c0ffee");
        match branch.commit {
            BranchCommit::Full(c) => {
                assert_eq!(c.subject, "Initial");
                assert_eq!(c.message, "Initial\n\nLonger body");
                assert!(!c.message_truncated());
                assert_eq!(c.committer.date.timestamp(), 0);
            }
            other => panic!("expected full commit, got {other:?}"),
        }
    }

    #[test]
    fn branch_without_commit() {
        let branch = decode_branch(BranchRecord { name: b"refs/heads/orphan".to_vec(), target_commit: None });
        assert_eq!(branch.name.to_string(), "orphan");
        assert_eq!(branch.commit, BranchCommit::Missing);
        assert!(branch.target_commit_id.is_empty());
    }

    #[test]
    fn commit_without_body_uses_subject() {
        let c = decode_commit(&FullCommitRecord {
            id: "1".into(),
            subject: b"Only subject".to_vec(),
            ..Default::default()
        });
        assert_eq!(c.message, "Only subject");
    }

    #[test]
    fn lightweight_tag_targets_its_own_id() {
        let tag = decode_tag(TagRecord {
            name: b"refs/tags/v1.0".to_vec(),
            id: "deadbeef".into(),
            ..Default::default()
        });
        assert_eq!(tag.name.to_string(), "v1.0");
        assert_eq!(tag.target_commit_id, "deadbeef");
        assert!(!tag.is_annotated());
    }

    #[test]
    fn annotated_tag_keeps_message_and_tagger() {
        let tag = decode_tag(TagRecord {
            name: b"v2.0".to_vec(),
            id: "tagobj".into(),
            target_commit: Some(FullCommitRecord { id: "c2".into(), ..Default::default() }),
            message: b"Release 2.0".to_vec(),
            message_size: 11,
            tagger: Some(author(b"Rel Eng", 42)),
        });
        assert_eq!(tag.id, "tagobj");
        assert_eq!(tag.target_commit_id, "c2");
        assert_eq!(tag.message, "Release 2.0");
        assert!(!tag.message_truncated());
        assert_eq!(tag.tagger.unwrap().name, "Rel Eng");
    }

    #[test]
    fn annotated_tag_without_commit_keeps_object_id_separate() {
        let tag = decode_tag(TagRecord {
            name: b"v3.0".to_vec(),
            id: "tagobj".into(),
            message: b"Release 3.0".to_vec(),
            message_size: 11,
            tagger: Some(author(b"Rel Eng", 42)),
            ..Default::default()
        });
        assert_eq!(tag.id, "tagobj");
        assert!(tag.target_commit_id.is_empty());
        assert!(tag.target_commit.is_none());
    }

    #[test]
    fn truncated_body_with_invalid_bytes_is_flagged() {
        let c = decode_commit(&FullCommitRecord {
            id: "1".into(),
            subject: b"s".to_vec(),
            body: b"\xff\xff\xff\xff".to_vec(),
            body_size: 10,
            ..Default::default()
        });
        // coerced text is longer than the bytes received
        assert!(c.message.len() as u64 > c.body_size);
        assert_eq!(c.body_received, 4);
        assert!(c.message_truncated());
    }

    #[test]
    fn truncated_tag_message_with_invalid_bytes_is_flagged() {
        let tag = decode_tag(TagRecord {
            name: b"v4.0".to_vec(),
            id: "tagobj".into(),
            message: b"\xfe\xfe\xfe".to_vec(),
            message_size: 8,
            ..Default::default()
        });
        assert_eq!(tag.message_received, 3);
        assert!(tag.message_truncated());
    }

    #[test]
    fn ref_name_normalization_replaces_invalid_bytes() {
        assert_eq!(normalize_ref_name(b"refs/heads/ok").as_bytes(), b"refs/heads/ok");
        assert_eq!(normalize_ref_name(b"refs/heads/\xff").to_string(), "refs/heads/\u{fffd}");
    }

    proptest! {
        #[test]
        fn n_chunks_of_m_names_flatten_to_n_times_m(n in 0usize..8, m in 0usize..8) {
            let input: Vec<Result<RefResponse, TransportError>> = (0..n)
                .map(|i| {
                    let names = (0..m).map(|j| format!("refs/heads/b{i}-{j}").into_bytes()).collect();
                    Ok(RefResponse::Names { names })
                })
                .collect();
            let names: Vec<RefName> = block_on(
                decode_names(chunks(input), Method::FindAllBranchNames, branch_name).try_collect(),
            )
            .unwrap();
            prop_assert_eq!(names.len(), n * m);
            let expected: Vec<String> = (0..n)
                .flat_map(|i| (0..m).map(move |j| format!("b{i}-{j}")))
                .collect();
            let got: Vec<String> = names.iter().map(|n| n.to_string()).collect();
            prop_assert_eq!(got, expected);
        }
    }
}
