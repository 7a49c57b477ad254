//! Session data model.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// An active sharing session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Six-character session code, uppercase.
    pub code: String,
    /// When the session was created or joined.
    pub started_at: DateTime<Utc>,
    /// Label of the local device.
    pub device_name: String,
}

impl Session {
    /// Create a session starting now.
    #[must_use]
    pub fn new(code: impl Into<String>, device_name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            started_at: Utc::now(),
            device_name: device_name.into(),
        }
    }
}

/// Which side of the session produced an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SenderSide {
    /// Shared from this device.
    Local,
    /// Received from the peer.
    Remote,
}

impl SenderSide {
    const fn id_prefix(self) -> &'static str {
        match self {
            Self::Local => "l",
            Self::Remote => "r",
        }
    }
}

/// Item type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Text,
    Code,
    File,
    Image,
}

impl ItemKind {
    /// All kinds, in display order.
    pub const ALL: [Self; 4] = [Self::Text, Self::Code, Self::File, Self::Image];

    /// Wire name of the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Code => "code",
            Self::File => "file",
            Self::Image => "image",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata of a shared file. The bytes themselves never leave the device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMeta {
    pub file_name: String,
    pub file_size: u64,
}

impl FileMeta {
    #[must_use]
    pub fn new(file_name: impl Into<String>, file_size: u64) -> Self {
        Self {
            file_name: file_name.into(),
            file_size,
        }
    }
}

/// Type-specific payload of a transfer item.
///
/// File metadata only exists on `File`, and a language only on `Code`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ItemBody {
    Text {
        content: String,
    },
    Code {
        content: String,
        language: String,
    },
    File {
        #[serde(flatten)]
        meta: FileMeta,
    },
    Image {
        content: String,
    },
}

/// One shared unit of content. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferItem {
    /// Unique within the session.
    pub id: String,
    #[serde(flatten)]
    pub body: ItemBody,
    pub timestamp: DateTime<Utc>,
    pub sender: SenderSide,
}

impl TransferItem {
    /// Create an item with a fresh id and the current time.
    #[must_use]
    pub fn new(body: ItemBody, sender: SenderSide) -> Self {
        Self {
            id: format!("{}-{}", sender.id_prefix(), Uuid::new_v4().simple()),
            body,
            timestamp: Utc::now(),
            sender,
        }
    }

    /// Text item.
    #[must_use]
    pub fn text(content: impl Into<String>, sender: SenderSide) -> Self {
        Self::new(
            ItemBody::Text {
                content: content.into(),
            },
            sender,
        )
    }

    /// Code snippet item.
    #[must_use]
    pub fn code(content: impl Into<String>, language: impl Into<String>, sender: SenderSide) -> Self {
        Self::new(
            ItemBody::Code {
                content: content.into(),
                language: language.into(),
            },
            sender,
        )
    }

    /// File item (metadata only).
    #[must_use]
    pub fn file(meta: FileMeta, sender: SenderSide) -> Self {
        Self::new(ItemBody::File { meta }, sender)
    }

    /// Override the id. Used for fixed sample data.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Override the timestamp.
    #[must_use]
    pub const fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    #[must_use]
    pub const fn kind(&self) -> ItemKind {
        match self.body {
            ItemBody::Text { .. } => ItemKind::Text,
            ItemBody::Code { .. } => ItemKind::Code,
            ItemBody::File { .. } => ItemKind::File,
            ItemBody::Image { .. } => ItemKind::Image,
        }
    }

    /// Textual content; empty for files.
    #[must_use]
    pub fn content(&self) -> &str {
        match &self.body {
            ItemBody::Text { content }
            | ItemBody::Code { content, .. }
            | ItemBody::Image { content } => content,
            ItemBody::File { .. } => "",
        }
    }

    #[must_use]
    pub fn language(&self) -> Option<&str> {
        match &self.body {
            ItemBody::Code { language, .. } => Some(language),
            _ => None,
        }
    }

    #[must_use]
    pub fn file_meta(&self) -> Option<&FileMeta> {
        match &self.body {
            ItemBody::File { meta } => Some(meta),
            _ => None,
        }
    }

    /// One line describing this item for an assistant search prompt.
    #[must_use]
    pub fn summary_line(&self) -> String {
        match &self.body {
            ItemBody::File { meta } => {
                let name = if meta.file_name.is_empty() {
                    "file"
                } else {
                    meta.file_name.as_str()
                };
                format!("- [{}] {name}", self.kind())
            }
            _ => {
                let preview: String = self.content().chars().take(100).collect();
                format!("- [{}] {preview}", self.kind())
            }
        }
    }
}

/// Ledger entry for an ended session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentSessionEntry {
    pub code: String,
    /// Human-readable end date.
    pub date: String,
    pub item_count: usize,
}

impl RecentSessionEntry {
    #[must_use]
    pub fn new(code: impl Into<String>, date: impl Into<String>, item_count: usize) -> Self {
        Self {
            code: code.into(),
            date: date.into(),
            item_count,
        }
    }
}

/// Structured result returned by the assistant. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detected_language: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_string_list",
        skip_serializing_if = "Option::is_none"
    )]
    pub tags: Option<Vec<String>>,
}

impl AgentResult {
    /// Apply smart-action defaults: the action name stands in for a missing
    /// type, `"Result"` for a missing title.
    #[must_use]
    pub fn resolve(self, action: &str) -> SmartActionResult {
        SmartActionResult {
            action_type: self.action_type.unwrap_or_else(|| action.to_string()),
            title: self.title.unwrap_or_else(|| "Result".to_string()),
            content: self.content.unwrap_or_default(),
            detected_language: self.detected_language.unwrap_or_default(),
            tags: self.tags.unwrap_or_default(),
        }
    }
}

/// Smart-action result with all defaults applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmartActionResult {
    pub action_type: String,
    pub title: String,
    pub content: String,
    pub detected_language: String,
    pub tags: Vec<String>,
}

/// Accepts a list of strings; anything else (object, number, mixed array)
/// becomes `None`.
fn lenient_string_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value::<Vec<String>>(value).ok())
}
