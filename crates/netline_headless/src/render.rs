//! ASCII rendering of a live session for terminal review.
//!
//! | Glyph | Tile |
//! |-------|------|
//! | ` `   | gap |
//! | `.`   | open floor |
//! | `-`   | network line with no virus |
//! | `r` / `g` / `b` | line carrying a red / green / blue virus |
//! | `F`   | firewall |
//! | `H`   | hub |
//! | `S`   | character spawn pad |
//! | `@`   | player |
//!
//! With colour enabled every glyph takes the owning team's colour.

use netline_core::grid::{Tile, TileKind};
use netline_core::session::Session;
use netline_core::team::{TeamColor, VirusColor};

/// ASCII rendering configuration.
#[derive(Debug, Clone)]
pub struct AsciiConfig {
    /// Print hub damage under the map.
    pub show_legend: bool,
    /// Use coloured output (ANSI).
    pub use_color: bool,
}

impl Default for AsciiConfig {
    fn default() -> Self {
        Self {
            show_legend: true,
            use_color: true,
        }
    }
}

/// ANSI color codes.
mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";

    pub const YELLOW: &str = "\x1b[33m";
    pub const CYAN: &str = "\x1b[36m";
    pub const MAGENTA: &str = "\x1b[35m";
    pub const RED: &str = "\x1b[31m";
    pub const GRAY: &str = "\x1b[90m";
}

fn team_color(team: TeamColor) -> &'static str {
    match team {
        TeamColor::Neutral => colors::GRAY,
        TeamColor::Amber => colors::YELLOW,
        TeamColor::Teal => colors::CYAN,
        TeamColor::Violet => colors::MAGENTA,
        TeamColor::Crimson => colors::RED,
    }
}

/// Glyph for one tile, ignoring colour.
#[must_use]
pub fn tile_char(tile: &Tile) -> char {
    if tile.occupant.is_some() {
        return '@';
    }
    if tile.is_spawner || tile.kind == TileKind::Hub {
        return 'H';
    }
    if tile.is_firewall {
        return 'F';
    }
    if tile.is_character_spawn {
        return 'S';
    }
    match tile.kind {
        TileKind::Gap => ' ',
        TileKind::Grid => '.',
        TileKind::NetworkLine | TileKind::Hub => match tile.virus {
            VirusColor::None => '-',
            VirusColor::Red => 'r',
            VirusColor::Green => 'g',
            VirusColor::Blue => 'b',
        },
    }
}

/// Render a session as ASCII art.
#[must_use]
pub fn render_ascii(session: &Session, config: &AsciiConfig) -> String {
    let (bold, reset) = if config.use_color {
        (colors::BOLD, colors::RESET)
    } else {
        ("", "")
    };

    let active = session
        .active_player()
        .map_or_else(|| "-".to_owned(), |p| p.id.to_string());
    let mut output = format!(
        "{bold}== {} | turn {} | tick {}/{} | active {} | {:?} =={reset}\n",
        session.session_id,
        session.turn,
        session.ticks,
        session.turn_tick_limit,
        active,
        session.status,
    );

    let last_column = session.grid.width() as i32 - 1;
    for tile in session.grid.tiles() {
        let ch = tile_char(tile);
        if config.use_color && ch != ' ' {
            output.push_str(team_color(tile.team));
            output.push(ch);
            output.push_str(colors::RESET);
        } else {
            output.push(ch);
        }
        if tile.coord.x == last_column {
            output.push('\n');
        }
    }

    if config.show_legend {
        for team in TeamColor::PLAYABLE {
            let seated = session.players.iter().any(|p| p.team == team);
            if !seated {
                continue;
            }
            let damage = session.hub_damage.get(&team).copied().unwrap_or(0);
            output.push_str(&format!(
                "{}: hub damage {damage}/{}\n",
                team.display_name(),
                session.rules.hub_damage_limit
            ));
        }
    }

    output
}
