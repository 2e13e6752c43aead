//! Single-event operations and broadcast controls

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::gateway::{ApiGateway, ApiRequest};
use crate::models::{
    BroadcastId, BroadcastInfo, EventChanges, EventId, EventUpdateRequest, GameEvent, MediaId,
    OrganizationId, Recording,
};

/// Lifecycle command for a broadcast
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BroadcastAction {
    Start,
    Pause,
    Resume,
    Stop,
}

impl BroadcastAction {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Pause => "pause",
            Self::Resume => "resume",
            Self::Stop => "stop",
        }
    }
}

impl fmt::Display for BroadcastAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BroadcastAction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "start" => Ok(Self::Start),
            "pause" => Ok(Self::Pause),
            "resume" => Ok(Self::Resume),
            "stop" => Ok(Self::Stop),
            other => Err(Error::OperationFailed(format!(
                "unknown broadcast action: {other}"
            ))),
        }
    }
}

#[derive(Serialize)]
struct CommentaryToggle {
    on: bool,
}

pub struct GameEventService {
    gateway: Arc<ApiGateway>,
}

impl GameEventService {
    pub fn new(gateway: Arc<ApiGateway>) -> Self {
        Self { gateway }
    }

    /// Fetch one event. `kind` is the event type code (e.g. `game`).
    pub async fn get(
        &self,
        organization_id: &OrganizationId,
        event_id: &EventId,
        kind: &str,
    ) -> Result<GameEvent> {
        let request = ApiRequest::get(format!("/events/game/{event_id}"))
            .query("kind", kind)
            .club(organization_id);
        self.gateway
            .json(&request)
            .await
            .map_err(Error::into_fetch)
    }

    /// Re-submit `event` with `changes` applied.
    ///
    /// The backend replaces the whole event, so the payload always starts
    /// from the current state rather than from the edited fields alone.
    pub async fn update(
        &self,
        organization_id: &OrganizationId,
        event: &GameEvent,
        changes: EventChanges,
    ) -> Result<GameEvent> {
        let payload = EventUpdateRequest::from_event(event).with_changes(changes);
        let request = ApiRequest::patch(format!("/events/{}/{}", event.kind.code, event.id))
            .club(organization_id)
            .json(&payload)?;

        let updated: GameEvent = self
            .gateway
            .json(&request)
            .await
            .map_err(Error::into_operation_failed)?;
        info!(event_id = %event.id, "Event updated");
        Ok(updated)
    }

    pub async fn control_broadcast(
        &self,
        organization_id: &OrganizationId,
        broadcast_id: &BroadcastId,
        action: BroadcastAction,
    ) -> Result<BroadcastInfo> {
        let request = ApiRequest::post(format!("/livestreams/{broadcast_id}/{action}"))
            .club(organization_id);
        let broadcast: BroadcastInfo = self
            .gateway
            .json(&request)
            .await
            .map_err(Error::into_operation_failed)?;
        info!(
            broadcast_id = %broadcast_id,
            action = %action,
            state = %broadcast.state,
            "Broadcast command accepted"
        );
        Ok(broadcast)
    }

    /// Run `action` on the event's broadcast and return the event as the
    /// backend now reports it.
    ///
    /// The event is re-fetched whether or not the command succeeded, so a
    /// caller holding a stale copy can pick up the real state. A failed
    /// command is still returned as the error.
    pub async fn control_and_reload(
        &self,
        organization_id: &OrganizationId,
        event: &GameEvent,
        action: BroadcastAction,
    ) -> Result<GameEvent> {
        let broadcast_id = Self::broadcast_id(event)?;
        let outcome = self
            .control_broadcast(organization_id, broadcast_id, action)
            .await;
        if let Err(e) = outcome {
            if !e.is_auth() {
                let reload = self.get(organization_id, &event.id, &event.kind.code).await;
                if let Err(reload) = reload {
                    warn!(
                        event_id = %event.id,
                        error = %reload,
                        "Reload after failed broadcast command failed"
                    );
                }
            }
            return Err(e);
        }
        self.get(organization_id, &event.id, &event.kind.code).await
    }

    pub async fn set_commentary(
        &self,
        organization_id: &OrganizationId,
        broadcast_id: &BroadcastId,
        on: bool,
    ) -> Result<BroadcastInfo> {
        let request = ApiRequest::patch(format!("/livestreams/{broadcast_id}/commentary"))
            .club(organization_id)
            .json(&CommentaryToggle { on })?;
        self.gateway
            .json(&request)
            .await
            .map_err(Error::into_operation_failed)
    }

    /// Ask the broadcast to play `media_id`. The response body carries
    /// nothing useful and is dropped.
    pub async fn switch_media(
        &self,
        organization_id: &OrganizationId,
        broadcast_id: &BroadcastId,
        media_id: &MediaId,
    ) -> Result<()> {
        let request = ApiRequest::get(format!("/livestreams/{broadcast_id}/switch"))
            .query("switchToMediaId", media_id.as_str())
            .query("orgId", organization_id.as_str());
        self.gateway
            .send(&request)
            .await
            .map_err(Error::into_operation_failed)?;
        info!(broadcast_id = %broadcast_id, media_id = %media_id, "Media switch requested");
        Ok(())
    }

    /// Recording of a finished event; `None` until the backend has one.
    pub async fn recording(
        &self,
        organization_id: &OrganizationId,
        event_id: &EventId,
    ) -> Result<Option<Recording>> {
        let request =
            ApiRequest::get(format!("/events/{event_id}/recording")).club(organization_id);
        self.gateway
            .json_optional(&request)
            .await
            .map_err(Error::into_fetch)
    }

    fn broadcast_id(event: &GameEvent) -> Result<&BroadcastId> {
        event
            .broadcast
            .as_ref()
            .map(|b| &b.id)
            .ok_or_else(|| Error::OperationFailed(format!("event {} has no broadcast", event.id)))
    }
}
