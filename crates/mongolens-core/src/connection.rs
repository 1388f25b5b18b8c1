//! Saved connection identity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{MongolensError, Result};

const SCHEMES: [&str; 2] = ["mongodb+srv://", "mongodb://"];

/// Opaque identifier of a saved connection
///
/// Identifiers are compared by value only; their content carries no meaning.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(String);

impl ConnectionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Create a fresh random identifier
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ConnectionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ConnectionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A saved connection
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedConnection {
    /// Unique identifier
    pub id: ConnectionId,

    /// Display name
    pub name: String,

    /// Full connection string, credentials included
    pub connection_string: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last connected timestamp
    #[serde(default)]
    pub last_connected: Option<DateTime<Utc>>,
}

impl SavedConnection {
    /// Create a new saved connection
    pub fn new(name: impl Into<String>, connection_string: impl Into<String>) -> Self {
        let name = name.into();
        tracing::debug!(name = %name, "creating new saved connection");
        Self {
            id: ConnectionId::generate(),
            name,
            connection_string: connection_string.into(),
            created_at: Utc::now(),
            last_connected: None,
        }
    }

    /// Create a saved connection from a connection string, naming it after its hosts
    pub fn from_uri(uri: &str) -> Result<Self> {
        let uri = uri.trim();
        let hosts = host_segment(uri).ok_or_else(|| {
            MongolensError::InvalidArgument(
                "connection string must start with mongodb:// or mongodb+srv://".to_string(),
            )
        })?;
        if hosts.is_empty() {
            return Err(MongolensError::InvalidArgument(
                "connection string has no host".to_string(),
            ));
        }
        Ok(Self::new(hosts, uri))
    }

    /// Use a specific identifier instead of a generated one
    pub fn with_id(mut self, id: impl Into<ConnectionId>) -> Self {
        self.id = id.into();
        self
    }

    /// Connection string with any password replaced, safe to display or log
    pub fn redacted_connection_string(&self) -> String {
        redact_password(&self.connection_string)
    }
}

/// Split off the scheme and return what follows it
fn strip_scheme(uri: &str) -> Option<(&str, &str)> {
    SCHEMES
        .iter()
        .find_map(|scheme| uri.strip_prefix(scheme).map(|rest| (*scheme, rest)))
}

/// The `host[:port][,host...]` portion of a connection string
fn host_segment(uri: &str) -> Option<String> {
    let (_, rest) = strip_scheme(uri)?;
    let authority = rest.split(['/', '?']).next().unwrap_or_default();
    let hosts = match authority.rsplit_once('@') {
        Some((_, hosts)) => hosts,
        None => authority,
    };
    Some(hosts.to_string())
}

fn redact_password(uri: &str) -> String {
    let Some((scheme, rest)) = strip_scheme(uri) else {
        return uri.to_string();
    };
    let authority_end = rest.find(['/', '?']).unwrap_or(rest.len());
    let (authority, tail) = rest.split_at(authority_end);
    let Some((credentials, hosts)) = authority.rsplit_once('@') else {
        return uri.to_string();
    };
    let user = match credentials.split_once(':') {
        Some((user, _)) => format!("{user}:****"),
        None => credentials.to_string(),
    };
    format!("{scheme}{user}@{hosts}{tail}")
}
