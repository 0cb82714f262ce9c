//! Persisted row shape
//!
//! Both backends persist the same logical row:
//! `{id, file, key, value, type, context, created_at, updated_at}`.
//! The flat-file backend stores rows verbatim as a JSON array; the
//! relational backend maps them onto columns with an auto id.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One persisted settings entry in a flat-file store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Row {
    /// Handler-generated unique token; time-based, never used for ordering
    pub id: String,
    pub file: String,
    pub key: String,
    pub value: Option<String>,
    #[serde(rename = "type")]
    pub type_name: String,
    pub context: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Row {
    /// Mint a time-based unique row id
    pub fn mint_id() -> String {
        Uuid::now_v7().to_string()
    }
}

/// Current time in the row timestamp format (`YYYY-MM-DD HH:MM:SS`)
pub fn now_stamp() -> String {
    Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
}
