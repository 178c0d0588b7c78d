use crate::core::errors::GameError;
use crate::core::helpers::{format_coords, parse_coords};
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use std::fmt;
use std::str::FromStr;

/// Identifier a game keeps for its whole life.
pub type GameId = u64;

/// Content of a single board point.
///
/// `Boundary` is only ever returned by reads outside the board, it is never
/// stored. Persisted boards encode each value as its discriminant.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Stone {
    Empty = 0,
    Black = 1,
    White = 2,
    Boundary = 3,
}

impl From<Stone> for u8 {
    fn from(stone: Stone) -> u8 {
        stone as u8
    }
}

impl TryFrom<u8> for Stone {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Stone::Empty),
            1 => Ok(Stone::Black),
            2 => Ok(Stone::White),
            3 => Ok(Stone::Boundary),
            other => Err(format!("invalid stone value {}", other)),
        }
    }
}

impl Stone {
    pub fn color(&self) -> Option<StoneColor> {
        match self {
            Stone::Black => Some(StoneColor::Black),
            Stone::White => Some(StoneColor::White),
            _ => None,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum StoneColor {
    Black,
    White,
}

impl StoneColor {
    pub fn name(&self) -> &str {
        match self {
            Self::White => "white",
            Self::Black => "black",
        }
    }

    pub fn inverse(&self) -> Self {
        match self {
            Self::White => Self::Black,
            Self::Black => Self::White,
        }
    }

    pub fn stone(&self) -> Stone {
        match self {
            Self::White => Stone::White,
            Self::Black => Stone::Black,
        }
    }
}

impl From<StoneColor> for u8 {
    fn from(color: StoneColor) -> u8 {
        color.stone() as u8
    }
}

impl TryFrom<u8> for StoneColor {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Stone::try_from(value)?
            .color()
            .ok_or_else(|| format!("invalid turn color {}", value))
    }
}

/// A board point, zero based. `x` is the column, `y` the row.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coords {
    pub x: i32,
    pub y: i32,
}

impl Coords {
    pub fn from(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The four orthogonal neighbors: left, right, up, down.
    pub fn neighbors(&self) -> [Coords; 4] {
        [
            Coords::from(self.x - 1, self.y),
            Coords::from(self.x + 1, self.y),
            Coords::from(self.x, self.y - 1),
            Coords::from(self.x, self.y + 1),
        ]
    }
}

impl fmt::Display for Coords {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", format_coords(*self))
    }
}

impl FromStr for Coords {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_coords(s)
    }
}

/// Something a player can do on their turn.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Move {
    Place(Coords),
    Pass,
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Move::Place(coords) => write!(f, "move at {}", coords),
            Move::Pass => write!(f, "pass"),
        }
    }
}

/// Who may play a game: a roster per color, or anyone at all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Players {
    pub black: Vec<String>,
    pub white: Vec<String>,
    pub anyone: bool,
}

impl Players {
    pub fn anyone() -> Self {
        Self {
            anyone: true,
            ..Self::default()
        }
    }

    pub fn pair(black: &str, white: &str) -> Self {
        Self {
            black: vec![black.to_string()],
            white: vec![white.to_string()],
            anyone: false,
        }
    }

    pub fn plays(&self, color: StoneColor, player: &str) -> bool {
        if self.anyone {
            return true;
        }
        let roster = match color {
            StoneColor::Black => &self.black,
            StoneColor::White => &self.white,
        };
        roster.iter().any(|p| p == player)
    }

    /// True for any rostered player regardless of whose turn it is.
    pub fn is_player(&self, player: &str) -> bool {
        self.plays(StoneColor::Black, player) || self.plays(StoneColor::White, player)
    }
}
