use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Access and refresh token pair as issued by `/auth/login` and `/auth/google`.
///
/// Persisted as one record; the refresh flow only ever replaces `access_token`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(rename = "refreshTokenExpiryTime", deserialize_with = "deserialize_expiry")]
    pub refresh_token_expiry: DateTime<Utc>,
}

/// RFC 3339, or a bare `YYYY-MM-DDTHH:MM:SS[.fff]` read as UTC.
fn deserialize_expiry<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f").map(|ndt| ndt.and_utc())
        })
        .map_err(|_| serde::de::Error::custom(format!("invalid refresh token expiry: {raw}")))
}

impl TokenPair {
    /// Same pair with a new access token.
    #[must_use]
    pub fn with_access_token(&self, access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            ..self.clone()
        }
    }
}

impl std::fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("refresh_token_expiry", &self.refresh_token_expiry)
            .finish()
    }
}

/// Body of `GET /auth/refresh-token`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenResponse {
    pub access_token: String,
}

#[derive(Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Body of `POST /auth/google`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FederatedAssertion {
    pub id_token: String,
}

/// Profile returned by `GET /users/me`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

impl User {
    /// Best human-readable name available.
    #[must_use]
    pub fn display_name(&self) -> String {
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => format!("{first} {last}"),
            (Some(first), None) => first.clone(),
            _ => self
                .user_name
                .clone()
                .or_else(|| self.email.clone())
                .unwrap_or_else(|| self.id.clone()),
        }
    }
}

/// In-memory session state observed by the outer layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub is_authenticated: bool,
    pub current_user: Option<User>,
    pub is_loading: bool,
}

impl Session {
    /// State before persisted tokens have been checked.
    #[must_use]
    pub const fn loading() -> Self {
        Self {
            is_authenticated: false,
            current_user: None,
            is_loading: true,
        }
    }

    #[must_use]
    pub const fn signed_out() -> Self {
        Self {
            is_authenticated: false,
            current_user: None,
            is_loading: false,
        }
    }

    #[must_use]
    pub const fn signed_in(user: Option<User>) -> Self {
        Self {
            is_authenticated: true,
            current_user: user,
            is_loading: false,
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::loading()
    }
}
