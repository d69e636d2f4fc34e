//! Live feed channel protocol types.
//!
//! Frames are adjacently tagged `{"type": ..., "data": ...}` JSON text
//! messages in both directions, matching the feed clients.

use serde::{Deserialize, Serialize};

use crate::feed::TimeRange;
use crate::summary::Summary;

/// Subscription preference a client may register on the live channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedPrefs {
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default)]
    pub time_range: TimeRange,
}

/// Server-to-client frame on the live channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum LiveEvent {
    /// Periodic (or forced) push of the most recent summaries.
    FeedUpdate(Vec<Summary>),
    /// Acknowledgement of a `subscribe` command, echoing the preference.
    Subscribed(FeedPrefs),
    /// In-band error reply; the connection stays open.
    Error(String),
}

/// Client-to-server control frame on the live channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum ClientCommand {
    /// Record a delivery preference for this connection.
    Subscribe(FeedPrefs),
    /// Request an immediate out-of-cycle feed update.
    RequestUpdate,
}
