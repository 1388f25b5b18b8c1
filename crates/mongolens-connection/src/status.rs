//! Connection lifecycle states

use mongolens_core::ConnectionId;

/// Lifecycle state of the extension's single active connection
///
/// Each variant carries only the data valid in that state, so an active id
/// exists exactly when the state is `Connected`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ConnectionStatus {
    #[default]
    Idle,
    Connecting {
        target: ConnectionId,
    },
    Connected {
        id: ConnectionId,
    },
    Disconnecting {
        id: ConnectionId,
    },
}

impl ConnectionStatus {
    pub fn is_connecting(&self) -> bool {
        matches!(self, Self::Connecting { .. })
    }

    pub fn is_disconnecting(&self) -> bool {
        matches!(self, Self::Disconnecting { .. })
    }

    /// Whether a connect or disconnect is in flight
    pub fn is_transitioning(&self) -> bool {
        self.is_connecting() || self.is_disconnecting()
    }

    pub fn active_connection_id(&self) -> Option<&ConnectionId> {
        match self {
            Self::Connected { id } => Some(id),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Connecting { .. } => "connecting",
            Self::Connected { .. } => "connected",
            Self::Disconnecting { .. } => "disconnecting",
        }
    }
}

/// Broadcast after every state transition
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConnectionEvent {
    StatusChanged(ConnectionStatus),
}
