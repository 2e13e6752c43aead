//! Event listing with live broadcast state
//!
//! The windowed events endpoint is the source of truth for which events
//! exist; the running-broadcasts endpoint is the source of truth for their
//! broadcast state. Both are fetched and merged on every listing.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use tracing::debug;

use crate::config::EventsConfig;
use crate::error::{Error, Result};
use crate::gateway::{ApiGateway, ApiRequest};
use crate::models::{BroadcastId, BroadcastState, GameEvent, OrganizationId};

/// Display bucket of an event, derived at classification time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventBucket {
    Live,
    Upcoming,
    Past,
}

impl EventBucket {
    /// Explicit broadcast state wins over the wall clock: `running` is LIVE
    /// and `finished` is PAST whatever the scheduled end time says.
    #[must_use]
    pub fn of(event: &GameEvent, now: DateTime<Utc>) -> Self {
        match event.broadcast_state() {
            Some(BroadcastState::Running) => Self::Live,
            Some(BroadcastState::Finished) => Self::Past,
            _ if event.end_date_time < now => Self::Past,
            _ => Self::Upcoming,
        }
    }
}

/// Events split into buckets, each keeping the input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassifiedEvents {
    pub live: Vec<GameEvent>,
    pub upcoming: Vec<GameEvent>,
    pub past: Vec<GameEvent>,
}

impl ClassifiedEvents {
    #[must_use]
    pub fn len(&self) -> usize {
        self.live.len() + self.upcoming.len() + self.past.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Split `events` into LIVE / UPCOMING / PAST relative to `now`.
#[must_use]
pub fn classify(events: &[GameEvent], now: DateTime<Utc>) -> ClassifiedEvents {
    let mut classified = ClassifiedEvents::default();
    for event in events {
        let bucket = match EventBucket::of(event, now) {
            EventBucket::Live => &mut classified.live,
            EventBucket::Upcoming => &mut classified.upcoming,
            EventBucket::Past => &mut classified.past,
        };
        bucket.push(event.clone());
    }
    classified
}

/// Overwrite broadcast state in `events` with the state reported by the
/// running-broadcasts feed, matched by broadcast id.
///
/// Returns how many events changed state.
pub fn merge_running_state(events: &mut [GameEvent], running: &[GameEvent]) -> usize {
    let live_state: HashMap<&BroadcastId, BroadcastState> = running
        .iter()
        .filter_map(|event| event.broadcast.as_ref())
        .map(|broadcast| (&broadcast.id, broadcast.state))
        .collect();

    let mut changed = 0;
    for event in events.iter_mut() {
        let Some(broadcast) = event.broadcast.as_mut() else {
            continue;
        };
        if let Some(state) = live_state.get(&broadcast.id) {
            if broadcast.state != *state {
                debug!(
                    event_id = %event.id,
                    broadcast_id = %broadcast.id,
                    from = %broadcast.state,
                    to = %state,
                    "Broadcast state overwritten by running feed"
                );
                broadcast.state = *state;
                changed += 1;
            }
        }
    }
    changed
}

fn iso_millis(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub struct EventAggregator {
    gateway: Arc<ApiGateway>,
}

impl EventAggregator {
    pub fn new(gateway: Arc<ApiGateway>) -> Self {
        Self { gateway }
    }

    /// Events of `organization_id` within the window, newest first.
    pub async fn windowed_events(
        &self,
        organization_id: &OrganizationId,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> Result<Vec<GameEvent>> {
        let request = ApiRequest::get("/events/games")
            .query("orgId", organization_id.as_str())
            .query("startAfter", iso_millis(window_start))
            .query("endBefore", iso_millis(window_end))
            .club(organization_id);

        let mut events: Vec<GameEvent> = self
            .gateway
            .json(&request)
            .await
            .map_err(Error::into_fetch)?;
        events.sort_by(|a, b| b.start_date_time.cmp(&a.start_date_time));
        Ok(events)
    }

    /// Events of `organization_id` whose broadcast is currently active,
    /// oldest first.
    pub async fn running_broadcasts(
        &self,
        organization_id: &OrganizationId,
    ) -> Result<Vec<GameEvent>> {
        let request = ApiRequest::get("/events/running-broadcasts")
            .query("clubId", organization_id.as_str())
            .club(organization_id);

        let mut events: Vec<GameEvent> = self
            .gateway
            .json(&request)
            .await
            .map_err(Error::into_fetch)?;
        events.sort_by(|a, b| a.start_date_time.cmp(&b.start_date_time));
        Ok(events)
    }

    /// Windowed events with broadcast state taken from the running feed.
    ///
    /// Both calls must succeed; there is no partial result.
    pub async fn list_events(
        &self,
        organization_id: &OrganizationId,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> Result<Vec<GameEvent>> {
        let (mut events, running) = futures::future::try_join(
            self.windowed_events(organization_id, window_start, window_end),
            self.running_broadcasts(organization_id),
        )
        .await?;

        let changed = merge_running_state(&mut events, &running);
        debug!(
            organization_id = %organization_id,
            events = events.len(),
            running = running.len(),
            changed,
            "Listed events"
        );
        Ok(events)
    }

    /// Fetch, merge and classify the configured window around `now`.
    pub async fn list_around(
        &self,
        organization_id: &OrganizationId,
        now: DateTime<Utc>,
        window: &EventsConfig,
    ) -> Result<ClassifiedEvents> {
        let start = now - Duration::days(window.days_before);
        let end = now + Duration::days(window.days_after);
        let events = self.list_events(organization_id, start, end).await?;
        Ok(classify(&events, now))
    }
}
