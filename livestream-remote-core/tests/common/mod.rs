//! Shared fixtures for the integration tests

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, Utc};
use livestream_remote_core::auth::NoIdentityProvider;
use livestream_remote_core::models::TokenPair;
use livestream_remote_core::storage::MemoryTokenStore;
use livestream_remote_core::{Config, RemoteClient};
use wiremock::MockServer;

pub const ORG: &str = "club-1";

pub fn config(server: &MockServer) -> Config {
    let mut config = Config::default();
    config.api.base_url = server.uri();
    config
}

pub fn tokens(access: &str) -> TokenPair {
    serde_json::from_value(serde_json::json!({
        "accessToken": access,
        "refreshToken": "refresh-1",
        "refreshTokenExpiryTime": "2030-01-01T00:00:00Z"
    }))
    .unwrap()
}

/// Client whose store already holds a pair with `access` as access token.
pub fn signed_in_client(
    server: &MockServer,
    access: &str,
) -> (RemoteClient, Arc<MemoryTokenStore>) {
    client_with_store(server, MemoryTokenStore::with_tokens(tokens(access)))
}

pub fn signed_out_client(server: &MockServer) -> (RemoteClient, Arc<MemoryTokenStore>) {
    client_with_store(server, MemoryTokenStore::new())
}

fn client_with_store(
    server: &MockServer,
    store: MemoryTokenStore,
) -> (RemoteClient, Arc<MemoryTokenStore>) {
    let store = Arc::new(store);
    let identity = Arc::new(NoIdentityProvider);
    let client = RemoteClient::new(&config(server), store.clone(), identity).unwrap();
    (client, store)
}

pub fn event_json(
    id: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    broadcast: Option<(&str, &str)>,
) -> serde_json::Value {
    let mut event = serde_json::json!({
        "id": id,
        "startDateTime": start.to_rfc3339(),
        "endDateTime": end.to_rfc3339(),
        "type": {"id": "t1", "code": "game", "name": "Game"},
        "homeTeamName": "Aris",
        "awayTeamName": "PAOK"
    });
    if let Some((broadcast_id, state)) = broadcast {
        event["broadcast"] = serde_json::json!({"id": broadcast_id, "state": state});
    }
    event
}
