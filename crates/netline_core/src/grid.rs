//! Tile arena for the match map.
//!
//! Tiles live in a single row-major `Vec` owned by the [`Grid`]. Everything
//! else (paths, players, routes) refers to tiles by [`Coord`], never by
//! holding a second copy of the tile.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::session::PlayerId;
use crate::team::{TeamColor, VirusColor};

// ============================================================================
// Coordinates
// ============================================================================

/// Integer grid coordinates. `x` is the column, `y` is the row.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Coord {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

impl Coord {
    /// Create new coordinates.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Coordinates one step in `direction`.
    #[must_use]
    pub const fn step(self, direction: Direction) -> Self {
        let (dx, dy) = direction.offset();
        Self::new(self.x + dx, self.y + dy)
    }

    /// Manhattan distance to `other`.
    #[must_use]
    pub const fn manhattan(self, other: Coord) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Returns true if `other` is one of the four grid neighbours.
    #[must_use]
    pub const fn is_adjacent(self, other: Coord) -> bool {
        self.manhattan(other) == 1
    }
}

/// The four grid directions, in neighbour search order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Decreasing `x`.
    Left,
    /// Increasing `x`.
    Right,
    /// Decreasing `y`.
    Up,
    /// Increasing `y`.
    Down,
}

impl Direction {
    /// All directions in the fixed order used by neighbour searches.
    pub const ALL: [Direction; 4] = [Self::Left, Self::Right, Self::Up, Self::Down];

    /// Unit offset for this direction.
    #[must_use]
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
            Self::Up => (0, -1),
            Self::Down => (0, 1),
        }
    }
}

// ============================================================================
// Tiles
// ============================================================================

/// Terrain class of a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TileKind {
    /// Impassable hole in the map.
    Gap,
    /// A segment a network line can run along.
    NetworkLine,
    /// Open floor.
    #[default]
    Grid,
    /// A team's hub.
    Hub,
}

impl TileKind {
    /// Returns true if players can stand on this kind of tile.
    #[must_use]
    pub const fn is_walkable(self) -> bool {
        !matches!(self, Self::Gap)
    }

    /// Returns true if a network line can extend onto this kind of tile.
    #[must_use]
    pub const fn carries_line(self) -> bool {
        matches!(self, Self::NetworkLine | Self::Hub)
    }
}

/// A single grid cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    /// Position of this tile in the grid.
    pub coord: Coord,
    /// Terrain class.
    pub kind: TileKind,
    /// Player currently standing here.
    pub occupant: Option<PlayerId>,
    /// Owning team.
    pub team: TeamColor,
    /// Virus colour of the line running through this tile.
    pub virus: VirusColor,
    /// Must be captured by occupation.
    pub is_firewall: bool,
    /// Origin of a network line (a team hub).
    pub is_spawner: bool,
    /// Characters may spawn here.
    pub is_character_spawn: bool,
    /// Accumulated capture progress.
    pub capture_ticks: u32,
    /// Progress needed to flip ownership.
    pub max_capture_ticks: u32,
    /// Per-team capture permission. Absent means no decision yet.
    pub capturable_by: BTreeMap<TeamColor, bool>,
}

impl Tile {
    /// Create a neutral, unoccupied tile.
    #[must_use]
    pub fn new(coord: Coord, kind: TileKind) -> Self {
        Self {
            coord,
            kind,
            occupant: None,
            team: TeamColor::Neutral,
            virus: VirusColor::None,
            is_firewall: false,
            is_spawner: false,
            is_character_spawn: false,
            capture_ticks: 0,
            max_capture_ticks: 0,
            capturable_by: BTreeMap::new(),
        }
    }

    /// Returns true unless `team` has been explicitly locked out.
    #[must_use]
    pub fn is_capturable_by(&self, team: TeamColor) -> bool {
        self.capturable_by.get(&team).copied().unwrap_or(true)
    }
}

// ============================================================================
// Grid
// ============================================================================

/// Row-major tile arena.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    /// Width in tiles.
    width: u32,
    /// Height in tiles.
    height: u32,
    /// Tiles stored in row-major order.
    tiles: Vec<Tile>,
}

impl Grid {
    /// Build a grid from rows of tile kinds. Every row must have the same
    /// length.
    ///
    /// # Errors
    ///
    /// Returns `GameError::ScenarioParse` for empty or ragged input.
    pub fn from_rows(rows: &[Vec<TileKind>]) -> Result<Self> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        if width == 0 || height == 0 {
            return Err(GameError::ScenarioParse("map has no tiles".into()));
        }
        if let Some(bad) = rows.iter().position(|row| row.len() != width) {
            return Err(GameError::ScenarioParse(format!(
                "row {bad} has {} tiles, expected {width}",
                rows[bad].len()
            )));
        }

        let tiles = rows
            .iter()
            .enumerate()
            .flat_map(|(y, row)| {
                row.iter()
                    .enumerate()
                    .map(move |(x, &kind)| Tile::new(Coord::new(x as i32, y as i32), kind))
            })
            .collect();

        Ok(Self {
            width: width as u32,
            height: height as u32,
            tiles,
        })
    }

    /// Grid width in tiles.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Grid height in tiles.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Check if coordinates are within grid bounds.
    #[must_use]
    pub fn in_bounds(&self, coord: Coord) -> bool {
        coord.x >= 0 && coord.y >= 0 && coord.x < self.width as i32 && coord.y < self.height as i32
    }

    #[inline]
    fn index(&self, coord: Coord) -> Option<usize> {
        self.in_bounds(coord)
            .then(|| (coord.y as usize) * (self.width as usize) + (coord.x as usize))
    }

    /// Get the tile at `coord`, if in bounds.
    #[must_use]
    pub fn get(&self, coord: Coord) -> Option<&Tile> {
        self.index(coord).map(|i| &self.tiles[i])
    }

    /// Get the tile at `coord` mutably, if in bounds.
    pub fn get_mut(&mut self, coord: Coord) -> Option<&mut Tile> {
        self.index(coord).map(|i| &mut self.tiles[i])
    }

    /// Get the tile at `coord`, failing for out-of-bounds coordinates.
    ///
    /// # Errors
    ///
    /// Returns `GameError::TileOutOfBounds`.
    pub fn tile(&self, coord: Coord) -> Result<&Tile> {
        self.get(coord).ok_or(GameError::TileOutOfBounds {
            x: coord.x,
            y: coord.y,
        })
    }

    /// Mutable variant of [`Grid::tile`].
    ///
    /// # Errors
    ///
    /// Returns `GameError::TileOutOfBounds`.
    pub fn tile_mut(&mut self, coord: Coord) -> Result<&mut Tile> {
        self.get_mut(coord).ok_or(GameError::TileOutOfBounds {
            x: coord.x,
            y: coord.y,
        })
    }

    /// Iterate over all tiles in row-major order.
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter()
    }

    /// Iterate mutably over all tiles in row-major order.
    pub fn tiles_mut(&mut self) -> impl Iterator<Item = &mut Tile> {
        self.tiles.iter_mut()
    }

    /// In-bounds neighbours of `coord`, in [`Direction::ALL`] order.
    pub fn neighbors(&self, coord: Coord) -> impl Iterator<Item = &Tile> + '_ {
        Direction::ALL
            .into_iter()
            .filter_map(move |d| self.get(coord.step(d)))
    }

    /// Returns true if a player cannot enter `coord`: out of bounds, a gap,
    /// or already occupied.
    #[must_use]
    pub fn is_obstructed(&self, coord: Coord) -> bool {
        self.get(coord)
            .map_or(true, |t| !t.kind.is_walkable() || t.occupant.is_some())
    }

    /// Move the occupancy marker of `player` to `to`, clearing any tile it
    /// previously held. Passing `None` only clears.
    pub fn place_occupant(&mut self, player: &PlayerId, to: Option<Coord>) {
        for tile in &mut self.tiles {
            if tile.occupant.as_ref() == Some(player) {
                tile.occupant = None;
            }
        }
        if let Some(tile) = to.and_then(|c| self.get_mut(c)) {
            tile.occupant = Some(player.clone());
        }
    }
}
