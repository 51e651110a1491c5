//! Typed arguments for instance-bound operations.
//!
//! Field names mirror the payload keys sent by the controller (camelCase on
//! the wire). Optional fields may be omitted or sent as `null`.

use serde::Deserialize;
use serde_json::Value;

/// Database location and key used to open or probe a connection.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectArgs {
    /// Path to the account's database directory.
    pub db_path: String,
    /// Hex-encoded decryption key.
    pub hex_key: String,
    /// Account identifier.
    pub wxid: String,
}

/// A page of messages from one session.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionPage {
    /// Session (conversation) identifier.
    pub session_id: String,
    /// Maximum number of rows.
    pub limit: Option<u32>,
    /// Rows to skip.
    pub offset: Option<u32>,
}

/// Messages newer than a timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMessagesQuery {
    /// Session (conversation) identifier.
    pub session_id: String,
    /// Exclusive lower bound on message creation time.
    pub min_time: i64,
    /// Maximum number of rows.
    pub limit: Option<u32>,
}

/// A single session.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRef {
    /// Session (conversation) identifier.
    pub session_id: String,
}

/// A set of sessions.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSet {
    /// Session identifiers.
    pub session_ids: Vec<String>,
}

/// A set of sessions bounded by a time window.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRange {
    /// Session identifiers.
    pub session_ids: Vec<String>,
    /// Inclusive window start (unix seconds).
    pub begin_timestamp: Option<i64>,
    /// Inclusive window end (unix seconds).
    pub end_timestamp: Option<i64>,
}

/// Annual report extras with an optional peak-day window.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnualReportExtrasQuery {
    /// Session identifiers.
    pub session_ids: Vec<String>,
    /// Inclusive window start (unix seconds).
    pub begin_timestamp: Option<i64>,
    /// Inclusive window end (unix seconds).
    pub end_timestamp: Option<i64>,
    /// Start of the peak day.
    pub peak_day_begin: Option<i64>,
    /// End of the peak day.
    pub peak_day_end: Option<i64>,
}

/// A list of account usernames.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Usernames {
    /// Account usernames.
    pub usernames: Vec<String>,
}

/// A single contact.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactRef {
    /// Account username.
    pub username: String,
}

/// A single group chat.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatroomRef {
    /// Group chat identifier.
    pub chatroom_id: String,
}

/// Several group chats.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatroomRefs {
    /// Group chat identifiers.
    pub chatroom_ids: Vec<String>,
}

/// Group statistics over a time window.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupStatsQuery {
    /// Group chat identifier.
    pub chatroom_id: String,
    /// Inclusive window start (unix seconds).
    pub begin_timestamp: Option<i64>,
    /// Inclusive window end (unix seconds).
    pub end_timestamp: Option<i64>,
}

/// Raw message metadata from one table of one database file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageMetaQuery {
    /// Database file.
    pub db_path: String,
    /// Message table within the file.
    pub table_name: String,
    /// Maximum number of rows.
    pub limit: Option<u32>,
    /// Rows to skip.
    pub offset: Option<u32>,
}

/// Options for opening a streaming message cursor.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CursorOptions {
    /// Session (conversation) identifier.
    pub session_id: String,
    /// Rows per fetched batch.
    pub batch_size: Option<u32>,
    /// Oldest first when `true`.
    pub ascending: Option<bool>,
    /// Inclusive window start (unix seconds).
    pub begin_timestamp: Option<i64>,
    /// Inclusive window end (unix seconds).
    pub end_timestamp: Option<i64>,
}

/// Handle of an open message cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CursorRef {
    /// Cursor handle returned by `openMessageCursor`.
    pub cursor: i64,
}

/// Ad-hoc SQL against one of the account databases.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryArgs {
    /// Database family (for example `message`, `contact`).
    pub kind: String,
    /// Specific database file when the family has several.
    pub path: Option<String>,
    /// Statement to execute.
    pub sql: String,
}

/// Emoticon lookup by content hash.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmoticonRef {
    /// Database file holding the emoticon table.
    pub db_path: String,
    /// Content hash of the emoticon.
    pub md5: String,
}

/// A single message by local id.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRef {
    /// Session (conversation) identifier.
    pub session_id: String,
    /// Row id local to the session's message table.
    pub local_id: i64,
}

/// Voice clip lookup.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceQuery {
    /// Session (conversation) identifier.
    pub session_id: String,
    /// Creation time of the voice message.
    pub create_time: i64,
    /// Media databases to search, most likely first.
    #[serde(default)]
    pub candidates: Vec<String>,
    /// Row id local to the session's message table.
    pub local_id: Option<i64>,
    /// Server-side message id; numeric or string depending on its size.
    pub svr_id: Option<Value>,
}

/// Moments timeline page with optional filters.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnsTimelineQuery {
    /// Maximum number of posts.
    pub limit: Option<u32>,
    /// Posts to skip.
    pub offset: Option<u32>,
    /// Only posts by these authors.
    pub usernames: Option<Vec<String>>,
    /// Only posts containing this text.
    pub keyword: Option<String>,
    /// Inclusive window start (unix seconds).
    pub start_time: Option<i64>,
    /// Inclusive window end (unix seconds).
    pub end_time: Option<i64>,
}

/// A bare time window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeRange {
    /// Inclusive window start (unix seconds).
    pub begin_timestamp: Option<i64>,
    /// Inclusive window end (unix seconds).
    pub end_timestamp: Option<i64>,
}

/// Interactive user verification.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyArgs {
    /// Prompt shown to the user.
    pub message: String,
    /// Native handle of the owning window.
    pub hwnd: Option<i64>,
}
