pub mod auth;
pub mod event;
pub mod event_update;
pub mod id;
pub mod organization;

pub use auth::{Credentials, FederatedAssertion, RefreshTokenResponse, Session, TokenPair, User};
pub use event::{
    BroadcastInfo, BroadcastState, CommercialMedia, Court, EventKind, EventTeam, GameEvent,
    Recording, YtBroadcastDetails,
};
pub use event_update::{EventChanges, EventUpdateRequest};
pub use id::{BroadcastId, EventId, MediaId, OrganizationId};
pub use organization::Organization;

use serde::{Deserialize, Deserializer};

/// Treat an explicit JSON `null` like a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}
