//! Local application state and the patch merge for the state-update
//! channel.

use serde::{Deserialize, Serialize};

use crate::channel::LocalPatch;
use crate::session::{MatchStatus, Player, Session};

/// Root state held by a local client.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AppState {
    /// Transport is up.
    pub is_connected: bool,
    /// The local user.
    pub current_user: Option<Player>,
    /// Match the user is in.
    pub active_session: Option<Session>,
    /// Players gathered before a session exists.
    pub lobby: Vec<Player>,
}

impl AppState {
    /// Merge a patch and return the new state. Unknown patches leave the
    /// state untouched.
    #[must_use]
    pub fn apply(self, patch: LocalPatch) -> Self {
        match patch {
            LocalPatch::Connected => Self {
                is_connected: true,
                ..self
            },
            LocalPatch::ConnectionError => Self {
                is_connected: false,
                ..self
            },
            LocalPatch::SetUser { current_user } => Self {
                current_user: Some(current_user),
                ..self
            },
            LocalPatch::StartSinglePlayer { current_user } => Self {
                lobby: vec![current_user.clone()],
                current_user: Some(current_user),
                active_session: None,
                ..self
            },
            LocalPatch::MatchUpdate { session } => Self {
                active_session: Some(*session),
                ..self
            },
            LocalPatch::MatchCleanup => Self {
                active_session: None,
                current_user: None,
                lobby: Vec::new(),
                ..self
            },
            LocalPatch::PlayerEntered { current_user } => self.with_roster(|players| {
                if !players.iter().any(|p| p.id == current_user.id) {
                    players.push(current_user);
                }
            }),
            LocalPatch::PlayerLeft { current_user } => {
                self.with_roster(|players| players.retain(|p| p.id != current_user.id))
            }
            LocalPatch::Unknown => self,
        }
    }

    /// Edit the player list of the active session, or the lobby when no
    /// session is running.
    fn with_roster(mut self, edit: impl FnOnce(&mut Vec<Player>)) -> Self {
        match self.active_session.as_mut() {
            Some(session) => edit(&mut session.players),
            None => edit(&mut self.lobby),
        }
        self
    }

    /// Returns true if a match is running.
    #[must_use]
    pub fn in_match(&self) -> bool {
        self.active_session
            .as_ref()
            .is_some_and(|s| s.status == MatchStatus::Active)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::ScenarioTemplate;
    use crate::team::TeamColor;

    fn alice() -> Player {
        Player::new("alice", "Alice", TeamColor::Amber)
    }

    fn session() -> Session {
        ScenarioTemplate::from_ascii("t", &["H-h"])
            .unwrap()
            .start_match("s1", vec![alice()], true)
            .unwrap()
    }

    #[test]
    fn test_connection_flags() {
        let state = AppState::default().apply(LocalPatch::Connected);
        assert!(state.is_connected);
        let state = state.apply(LocalPatch::ConnectionError);
        assert!(!state.is_connected);
    }

    #[test]
    fn test_unknown_patch_is_noop() {
        let state = AppState::default()
            .apply(LocalPatch::SetUser {
                current_user: alice(),
            })
            .apply(LocalPatch::MatchUpdate {
                session: Box::new(session()),
            });
        let after = state.clone().apply(LocalPatch::Unknown);
        assert_eq!(after, state);
    }

    #[test]
    fn test_match_update_and_cleanup() {
        let state = AppState::default()
            .apply(LocalPatch::SetUser {
                current_user: alice(),
            })
            .apply(LocalPatch::MatchUpdate {
                session: Box::new(session()),
            });
        assert!(state.in_match());

        let state = state.apply(LocalPatch::MatchCleanup);
        assert!(state.active_session.is_none());
        assert!(state.current_user.is_none());
    }

    #[test]
    fn test_players_enter_and_leave() {
        let bob = Player::new("bob", "Bob", TeamColor::Teal);
        let state = AppState::default()
            .apply(LocalPatch::MatchUpdate {
                session: Box::new(session()),
            })
            .apply(LocalPatch::PlayerEntered {
                current_user: bob.clone(),
            })
            .apply(LocalPatch::PlayerEntered {
                current_user: bob.clone(),
            });
        assert_eq!(state.active_session.as_ref().unwrap().players.len(), 2);

        let state = state.apply(LocalPatch::PlayerLeft { current_user: bob });
        let players = &state.active_session.as_ref().unwrap().players;
        assert_eq!(players.len(), 1);
        assert_eq!(players[0].id, alice().id);
    }

    #[test]
    fn test_single_player_lobby() {
        let state = AppState::default().apply(LocalPatch::StartSinglePlayer {
            current_user: alice(),
        });
        assert_eq!(state.lobby.len(), 1);
        assert!(!state.in_match());

        let state = state.apply(LocalPatch::PlayerEntered {
            current_user: Player::bot("bot", TeamColor::Teal),
        });
        assert_eq!(state.lobby.len(), 2);
    }
}
