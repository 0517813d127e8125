//! # Netline Core
//!
//! Deterministic turn-resolution engine for Netline, a grid capture game
//! where teams race network lines toward each other's hubs.
//!
//! This crate contains **only** rule logic:
//! - No rendering
//! - No transport
//! - No persistence
//! - No randomness
//!
//! Every resolver is a synchronous function over `&mut Session` that returns
//! the [`channel::Notification`]s it raised. The caller decides where those
//! go via [`channel::route`].
//!
//! ## Crate Structure
//!
//! - [`session`] - Session, player and path model
//! - [`grid`] - Tile arena and coordinates
//! - [`scenario`] - Scenario templates and match start
//! - [`turn`] - Tick counting and end-of-turn resolution
//! - [`network`] - Network line propagation
//! - [`combat`] - Ability resolution
//! - [`capture`] - Firewall capture
//! - [`bot`] - Bot controller
//! - [`intents`] - Remaining player intents
//! - [`channel`] - Outbound message routing
//! - [`client_state`] - Local state merge

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod bot;
pub mod capture;
pub mod channel;
pub mod character;
pub mod client_state;
pub mod combat;
pub mod error;
pub mod grid;
pub mod intents;
pub mod network;
pub mod pathfinding;
pub mod scenario;
pub mod session;
pub mod team;
pub mod turn;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::bot::{run_bot_turn, BotAction};
    pub use crate::capture::apply_capture;
    pub use crate::channel::{route, BroadcastSink, LocalPatch, NetMessage, Notification, Outbound};
    pub use crate::character::{Ability, Character, StatusEffect};
    pub use crate::client_state::AppState;
    pub use crate::combat::{apply_ability, use_ability};
    pub use crate::error::{GameError, Result};
    pub use crate::grid::{Coord, Direction, Grid, Tile, TileKind};
    pub use crate::network::propagate;
    pub use crate::pathfinding::{AStar, Pathfinder};
    pub use crate::scenario::ScenarioTemplate;
    pub use crate::session::{MatchRules, MatchStatus, Path, Player, PlayerId, Session};
    pub use crate::team::{TeamColor, VirusColor};
    pub use crate::turn::{advance_tick, end_turn};
}
