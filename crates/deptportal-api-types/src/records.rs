//! Email logs, important-data files and broadcast messages.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailLog {
    pub id: String,
    pub subject: String,
    #[serde(default)]
    pub recipients: Vec<String>,
    pub status: String,
    #[serde(with = "time::serde::rfc3339")]
    pub sent_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportantData {
    pub id: String,
    pub title: String,
    pub file_url: String,
    #[serde(with = "time::serde::rfc3339")]
    pub uploaded_at: OffsetDateTime,
}

/// Audience of a broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Audience {
    All,
    Students,
    Faculty,
    Alumni,
}

/// Email plus notice fan-out, delivered by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastRequest {
    pub subject: String,
    pub message: String,
    pub audience: Audience,
    /// Also publish the message as a notice.
    #[serde(default)]
    pub post_as_notice: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastReceipt {
    pub queued: u32,
    #[serde(default)]
    pub notice_id: Option<String>,
}
