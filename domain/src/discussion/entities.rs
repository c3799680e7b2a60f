//! Session entity

use crate::discussion::record::DiscussionRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A persistent discussion session (Entity)
///
/// The engine receives `record` and `current_round` as input and returns
/// an updated record plus the round's messages; reading and writing the
/// session store is entirely the caller's job.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub record: DiscussionRecord,
    pub current_round: u32,
}

impl Session {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        let title = title.into();
        Self {
            id: id.into(),
            record: DiscussionRecord::empty(title.clone()),
            title,
            created_at: Utc::now(),
            current_round: 0,
        }
    }
}
