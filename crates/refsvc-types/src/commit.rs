use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Convert seconds since the UNIX epoch to a UTC timestamp.
///
/// Second granularity only. Values chrono cannot represent fall back to the
/// epoch rather than failing: commit dates are advisory.
pub fn time_from_seconds(seconds: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(seconds, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

/// Author or committer identity with its timestamp.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    pub name: String,
    pub email: String,
    pub date: DateTime<Utc>,
}

/// A commit as returned by calls that carry the full commit object.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub id: String,
    /// First line of the message.
    pub subject: String,
    /// Message body as received. May be cut short by the backend, see
    /// [`Commit::message_truncated`].
    pub message: String,
    /// Size of the full body on the backend, in bytes.
    pub body_size: u64,
    /// Bytes of the body actually received, before UTF-8 coercion.
    pub body_received: u64,
    pub parent_ids: Vec<String>,
    pub author: Signature,
    pub committer: Signature,
}

impl Commit {
    /// Returns `true` if the backend sent less of the body than exists.
    pub fn message_truncated(&self) -> bool {
        self.body_size > self.body_received
    }
}

/// Commit metadata carrying only the subject line.
///
/// `message` holds the subject, never the full body. Callers must not assume
/// the message is complete.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialCommit {
    pub id: String,
    pub message: String,
    pub authored_date: DateTime<Utc>,
    pub author_name: String,
    pub author_email: String,
    pub committed_date: DateTime<Utc>,
    pub committer_name: String,
    pub committer_email: String,
}
