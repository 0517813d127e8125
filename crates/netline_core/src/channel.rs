//! Outbound notifications and their routing.
//!
//! Resolvers never talk to a transport. They return [`Notification`]s that
//! describe what changed, and [`route`] turns those into concrete messages
//! for either the local state-update channel ([`LocalPatch`]) or the network
//! broadcast channel ([`NetMessage`]). Every message carries an owned
//! snapshot, so later mutation of the live session never leaks into
//! something already handed outward.

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::session::{Player, PlayerId, Session};

/// What a resolver changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Notification {
    /// The whole session should be pushed.
    SessionUpdated,
    /// Only the tick counter moved.
    Tick,
    /// One player's state or tile occupancy changed.
    PlayerReplaced(PlayerId),
}

/// Patch for the in-process state-update channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LocalPatch {
    /// Transport connected.
    Connected,
    /// Transport failed or disconnected.
    ConnectionError,
    /// Set the local user.
    SetUser {
        /// The local user.
        current_user: Player,
    },
    /// Start a single-player lobby for the local user.
    StartSinglePlayer {
        /// The local user.
        current_user: Player,
    },
    /// Replace the active session.
    MatchUpdate {
        /// Snapshot of the session.
        session: Box<Session>,
    },
    /// Drop the active session and the local user.
    MatchCleanup,
    /// A player joined the active session.
    PlayerEntered {
        /// The joining player.
        current_user: Player,
    },
    /// A player left the active session.
    PlayerLeft {
        /// The departing player.
        current_user: Player,
    },
    /// Any tag this build does not know; ignored.
    #[serde(other)]
    Unknown,
}

/// Session-scoped message for the network broadcast channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NetMessage {
    /// Full session replacement.
    MatchUpdate {
        /// Session the message belongs to.
        session_id: String,
        /// Snapshot of the session.
        session: Box<Session>,
    },
    /// Tick notification without state.
    MatchTick {
        /// Session the message belongs to.
        session_id: String,
    },
    /// Single player delta.
    PlayerMapReplace {
        /// Session the message belongs to.
        session_id: String,
        /// Snapshot of the player.
        player: Box<Player>,
    },
    /// A user is ready to join a session.
    PlayerAvailable {
        /// Session to join.
        session_id: String,
        /// The joining user.
        current_user: Player,
    },
}

impl NetMessage {
    /// Session this message is scoped to.
    #[must_use]
    pub fn session_id(&self) -> &str {
        match self {
            Self::MatchUpdate { session_id, .. }
            | Self::MatchTick { session_id }
            | Self::PlayerMapReplace { session_id, .. }
            | Self::PlayerAvailable { session_id, .. } => session_id,
        }
    }

    /// Encode as one JSON line.
    ///
    /// # Errors
    ///
    /// Returns `GameError::Serialization` if encoding fails.
    pub fn encode(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| GameError::Serialization(e.to_string()))
    }

    /// Decode from JSON.
    ///
    /// # Errors
    ///
    /// Returns `GameError::Serialization` for malformed input.
    pub fn decode(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| GameError::Serialization(e.to_string()))
    }
}

/// A routed message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    /// Deliver to the local state-update channel.
    Local(LocalPatch),
    /// Publish on the broadcast channel.
    Broadcast(NetMessage),
}

/// Receiver for broadcast messages; implemented by the host transport.
pub trait BroadcastSink {
    /// Publish one message to every participant.
    ///
    /// # Errors
    ///
    /// Implementations report transport failures.
    fn publish(&mut self, message: &NetMessage) -> Result<()>;
}

/// Turn resolver notifications into channel messages.
///
/// Single-player sessions always route through the local channel and get
/// one full update no matter how many notifications were raised.
/// Multiplayer sessions get one broadcast per notification; player deltas
/// are dropped when a full update is already going out.
#[must_use]
pub fn route(session: &Session, notifications: &[Notification]) -> Vec<Outbound> {
    if notifications.is_empty() {
        return Vec::new();
    }

    if session.is_single_player {
        return vec![Outbound::Local(LocalPatch::MatchUpdate {
            session: Box::new(session.clone()),
        })];
    }

    let full_update = notifications.contains(&Notification::SessionUpdated);
    let session_id = session.session_id.clone();
    let mut out = Vec::new();
    for notification in notifications {
        let message = match notification {
            Notification::SessionUpdated => NetMessage::MatchUpdate {
                session_id: session_id.clone(),
                session: Box::new(session.clone()),
            },
            Notification::Tick if full_update => continue,
            Notification::Tick => NetMessage::MatchTick {
                session_id: session_id.clone(),
            },
            Notification::PlayerReplaced(_) if full_update => continue,
            Notification::PlayerReplaced(id) => match session.player(id) {
                Some(player) => NetMessage::PlayerMapReplace {
                    session_id: session_id.clone(),
                    player: Box::new(player.clone()),
                },
                None => continue,
            },
        };
        if !out.contains(&Outbound::Broadcast(message.clone())) {
            out.push(Outbound::Broadcast(message));
        }
    }
    out
}
