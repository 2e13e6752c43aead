//! Game event and broadcast types as returned by the `/events` and
//! `/livestreams` endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::{BroadcastId, EventId, MediaId};
use super::null_as_default;

/// Broadcast lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BroadcastState {
    Scheduled,
    Creating,
    Running,
    Paused,
    Finished,
    Cancelled,
    Errored,
    Deleting,
    /// Any state this client does not know about yet
    #[serde(other)]
    Unknown,
}

impl BroadcastState {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Creating => "creating",
            Self::Running => "running",
            Self::Paused => "paused",
            Self::Finished => "finished",
            Self::Cancelled => "cancelled",
            Self::Errored => "errored",
            Self::Deleting => "deleting",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for BroadcastState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Event type descriptor (`type` on the wire)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventKind {
    pub id: String,
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastInfo {
    pub id: BroadcastId,
    pub state: BroadcastState,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub youtube_stream_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub youtube_stream_key2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_commentary_on: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub court_top_left_logo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub court_top_right_logo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub court_bottom_left_logo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub court_bottom_right_logo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub court_center_logo: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventTeam {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub three_letter_identifier: Option<String>,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub is_home_team: bool,
    #[serde(default)]
    pub team_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Court {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Media that can be switched onto a running broadcast
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommercialMedia {
    pub id: MediaId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YtBroadcastDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub broadcast_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub broadcast_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub broadcast_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameEvent {
    pub id: EventId,
    pub start_date_time: DateTime<Utc>,
    pub end_date_time: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: EventKind,
    #[serde(default)]
    pub broadcast: Option<BroadcastInfo>,
    #[serde(default)]
    pub place: Option<String>,
    #[serde(default)]
    pub court: Option<Court>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub teams: Vec<EventTeam>,
    #[serde(default)]
    pub home_team_name: Option<String>,
    #[serde(default)]
    pub home_team_logo: Option<String>,
    #[serde(default)]
    pub away_team_name: Option<String>,
    #[serde(default)]
    pub away_team_logo: Option<String>,
    #[serde(default)]
    pub competition_name: Option<String>,
    #[serde(default)]
    pub competition_logo: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub media: Vec<CommercialMedia>,
    #[serde(default)]
    pub yt_broadcast_details: Option<YtBroadcastDetails>,
}

impl GameEvent {
    #[must_use]
    pub fn broadcast_state(&self) -> Option<BroadcastState> {
        self.broadcast.as_ref().map(|b| b.state)
    }

    /// "Home - Away" when both names are known, otherwise the event type name.
    #[must_use]
    pub fn title(&self) -> String {
        match (&self.home_team_name, &self.away_team_name) {
            (Some(home), Some(away)) => format!("{home} - {away}"),
            _ => self
                .kind
                .name
                .clone()
                .unwrap_or_else(|| self.kind.code.clone()),
        }
    }
}

/// Recording produced for a finished broadcast
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recording {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}
