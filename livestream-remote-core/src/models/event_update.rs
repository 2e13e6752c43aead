use chrono::{DateTime, Utc};
use serde::Serialize;

use super::event::{CommercialMedia, GameEvent, YtBroadcastDetails};

/// Full payload accepted by `PATCH /events/{type}/{id}`.
///
/// The backend replaces the event with this payload, so it is always built
/// from the current event and then edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventUpdateRequest {
    pub team_ids: Vec<String>,
    pub start_date_time: DateTime<Utc>,
    pub end_date_time: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub place: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub court_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub is_game_announcement_enabled: bool,
    pub is_broadcast: bool,
    pub is_record: bool,
    pub is_commentary_on: bool,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub youtube_stream_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub youtube_stream_key2: Option<String>,
    #[serde(rename = "eventYTConfig", skip_serializing_if = "Option::is_none")]
    pub event_yt_config: Option<YtBroadcastDetails>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub home_team_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub home_team_logo_preview: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub away_team_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub away_team_logo_preview: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub competition_logo_preview: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub competition_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub court_top_left_logo_preview: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub court_top_right_logo_preview: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub court_bottom_left_logo_preview: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub court_bottom_right_logo_preview: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub court_center_logo_preview: Option<String>,
    pub uploaded_medias: Vec<CommercialMedia>,
    #[serde(rename = "gameAnnouncementNHoursBefore")]
    pub game_announcement_n_hours_before: String,
    #[serde(rename = "gameAnnouncementNHoursBeforeHours")]
    pub game_announcement_hours: String,
    #[serde(rename = "gameAnnouncementNHoursBeforeMins")]
    pub game_announcement_mins: String,
}

impl EventUpdateRequest {
    /// Payload that re-submits `event` unchanged apart from the backend's
    /// defaults for announcement timing and feature flags.
    #[must_use]
    pub fn from_event(event: &GameEvent) -> Self {
        let broadcast = event.broadcast.as_ref();
        Self {
            team_ids: event.teams.iter().map(|t| t.id.clone()).collect(),
            start_date_time: event.start_date_time,
            end_date_time: event.end_date_time,
            place: event.place.clone(),
            court_id: event.court.as_ref().map(|c| c.id.clone()),
            notes: event.notes.clone(),
            is_game_announcement_enabled: false,
            is_broadcast: false,
            is_record: false,
            is_commentary_on: false,
            kind: event.kind.name.clone(),
            youtube_stream_key: broadcast.and_then(|b| b.youtube_stream_key.clone()),
            youtube_stream_key2: broadcast.and_then(|b| b.youtube_stream_key2.clone()),
            event_yt_config: event.yt_broadcast_details.clone(),
            home_team_name: event.home_team_name.clone(),
            home_team_logo_preview: event.home_team_logo.clone(),
            away_team_name: event.away_team_name.clone(),
            away_team_logo_preview: event.away_team_logo.clone(),
            competition_logo_preview: event.competition_logo.clone(),
            competition_name: event.competition_name.clone(),
            court_top_left_logo_preview: broadcast.and_then(|b| b.court_top_left_logo.clone()),
            court_top_right_logo_preview: broadcast.and_then(|b| b.court_top_right_logo.clone()),
            court_bottom_left_logo_preview: broadcast
                .and_then(|b| b.court_bottom_left_logo.clone()),
            court_bottom_right_logo_preview: broadcast
                .and_then(|b| b.court_bottom_right_logo.clone()),
            court_center_logo_preview: broadcast.and_then(|b| b.court_center_logo.clone()),
            uploaded_medias: event.media.clone(),
            game_announcement_n_hours_before: "01".to_string(),
            game_announcement_hours: "01".to_string(),
            game_announcement_mins: "01".to_string(),
        }
    }

    /// Apply the edited fields on top of this payload.
    #[must_use]
    pub fn with_changes(mut self, changes: EventChanges) -> Self {
        if let Some(start) = changes.start_date_time {
            self.start_date_time = start;
        }
        if let Some(end) = changes.end_date_time {
            self.end_date_time = end;
        }
        if let Some(key) = changes.youtube_stream_key {
            self.youtube_stream_key = Some(key);
        }
        if let Some(name) = changes.home_team_name {
            self.home_team_name = Some(name);
        }
        if let Some(name) = changes.away_team_name {
            self.away_team_name = Some(name);
        }
        if let Some(name) = changes.competition_name {
            self.competition_name = Some(name);
        }
        if let Some(notes) = changes.notes {
            self.notes = Some(notes);
        }
        if let Some(on) = changes.is_commentary_on {
            self.is_commentary_on = on;
        }
        self
    }
}

/// Editable event fields; `None` leaves the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventChanges {
    pub start_date_time: Option<DateTime<Utc>>,
    pub end_date_time: Option<DateTime<Utc>>,
    pub youtube_stream_key: Option<String>,
    pub home_team_name: Option<String>,
    pub away_team_name: Option<String>,
    pub competition_name: Option<String>,
    pub notes: Option<String>,
    pub is_commentary_on: Option<bool>,
}

impl EventChanges {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}
