use crate::core::entities::{Coords, Stone};
use crate::core::errors::GameError;
use crate::core::helpers::get_column_name;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::convert::TryFrom;
use std::fmt;

/// An immutable snapshot of the stones on a rectangular board.
///
/// Every operation that changes a stone returns a new `Board` and leaves the
/// receiver untouched, so a game can keep every past position around. Reads
/// outside the board yield [`Stone::Boundary`] and writes outside it are
/// ignored.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "Vec<Vec<Stone>>", try_from = "Vec<Vec<Stone>>")]
pub struct Board {
    rows: Vec<Vec<Stone>>,
}

impl Board {
    pub fn new(width: usize, height: usize) -> Self {
        Board {
            rows: vec![vec![Stone::Empty; width]; height],
        }
    }

    pub fn standard() -> Self {
        Board::new(19, 19)
    }

    /// Builds a board from rows given top to bottom. All rows must be of the
    /// same length and hold no boundary values.
    pub fn from_rows(rows: Vec<Vec<Stone>>) -> Result<Self, String> {
        if let Some(first) = rows.first() {
            if rows.iter().any(|row| row.len() != first.len()) {
                return Err("board rows differ in length".to_string());
            }
        }
        if rows.iter().flatten().any(|s| *s == Stone::Boundary) {
            return Err("board stores a boundary stone".to_string());
        }

        Ok(Board { rows })
    }

    pub fn width(&self) -> usize {
        self.rows.first().map_or(0, |row| row.len())
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    fn index(&self, x: i32, y: i32) -> Option<(usize, usize)> {
        if x < 0 || y < 0 {
            return None;
        }
        let (x, y) = (x as usize, y as usize);
        if y >= self.height() || x >= self.width() {
            return None;
        }
        Some((x, y))
    }

    pub fn get(&self, x: i32, y: i32) -> Stone {
        match self.index(x, y) {
            Some((x, y)) => self.rows[y][x],
            None => Stone::Boundary,
        }
    }

    /// Returns a copy with `(x, y)` set to `stone`. Out of range points give
    /// back an unmodified copy.
    pub fn set(&self, x: i32, y: i32, stone: Stone) -> Board {
        let mut copy = self.clone();
        copy.put(Coords::from(x, y), stone);
        copy
    }

    fn put(&mut self, at: Coords, stone: Stone) {
        if let Some((x, y)) = self.index(at.x, at.y) {
            self.rows[y][x] = stone;
        }
    }

    /// Counts the empty points touching the group that holds `(x, y)`.
    pub fn liberties(&self, x: i32, y: i32) -> usize {
        let color = self.get(x, y);
        if color == Stone::Boundary {
            return 0;
        }
        let mut liberties = 0;
        let mut visited: HashSet<Coords> = HashSet::new();
        let mut pending = vec![Coords::from(x, y)];

        while let Some(point) = pending.pop() {
            if !visited.insert(point) {
                continue;
            }
            let stone = self.get(point.x, point.y);
            if stone == Stone::Empty {
                liberties += 1;
                continue;
            }
            if stone != color {
                continue;
            }
            pending.extend(point.neighbors().iter());
        }

        liberties
    }

    /// Clears the whole group that holds `(x, y)` and returns the new board
    /// with the number of stones removed. Liberties are not checked here.
    pub fn capture(&self, x: i32, y: i32) -> (Board, usize) {
        let mut copy = self.clone();
        let color = self.get(x, y);
        if color.color().is_none() {
            return (copy, 0);
        }

        let mut captures = 0;
        let mut pending = vec![Coords::from(x, y)];

        while let Some(point) = pending.pop() {
            if copy.get(point.x, point.y) != color {
                continue;
            }
            copy.put(point, Stone::Empty);
            captures += 1;
            pending.extend(point.neighbors().iter());
        }

        (copy, captures)
    }

    /// Places `stone` at `(x, y)`, removes every opposing neighbor group left
    /// without liberties and returns the new board with the capture count.
    pub fn play(&self, x: i32, y: i32, stone: Stone) -> Result<(Board, usize), GameError> {
        if self.get(x, y) != Stone::Empty {
            return Err(GameError::OccupiedCell);
        }

        let mut next = self.set(x, y, stone);
        let mut captures = 0;

        for neighbor in Coords::from(x, y).neighbors().iter() {
            let other = next.get(neighbor.x, neighbor.y);
            if other.color().is_none() || other == stone {
                continue;
            }
            if next.liberties(neighbor.x, neighbor.y) == 0 {
                let (captured, count) = next.capture(neighbor.x, neighbor.y);
                next = captured;
                captures += count;
            }
        }

        if next.liberties(x, y) == 0 {
            return Err(GameError::Suicide);
        }

        Ok((next, captures))
    }

    pub fn equals(&self, other: &Board) -> bool {
        self == other
    }
}

impl From<Board> for Vec<Vec<Stone>> {
    fn from(board: Board) -> Self {
        board.rows
    }
}

impl TryFrom<Vec<Vec<Stone>>> for Board {
    type Error = String;

    fn try_from(rows: Vec<Vec<Stone>>) -> Result<Self, Self::Error> {
        Board::from_rows(rows)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "   ")?;
        for x in 0..self.width() {
            write!(f, " {}", get_column_name(x as i32))?;
        }
        writeln!(f)?;

        for (y, row) in self.rows.iter().enumerate() {
            write!(f, "{: >2} ", y + 1)?;
            for stone in row {
                let c = match stone {
                    Stone::Black => 'X',
                    Stone::White => 'O',
                    _ => '.',
                };
                write!(f, " {}", c)?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::entities::Stone::{Black as B, Empty as E, White as W};

    fn board(rows: Vec<Vec<Stone>>) -> Board {
        Board::from_rows(rows).unwrap()
    }

    #[test]
    fn standard_board_is_empty() {
        let b = Board::standard();

        assert_eq!(19, b.width());
        assert_eq!(19, b.height());
        assert_eq!(Stone::Empty, b.get(18, 18));
        assert_eq!(Stone::Empty, b.get(0, 0));
    }

    #[test]
    fn reads_outside_are_boundary() {
        let b = board(vec![vec![W, B], vec![E, E]]);

        for (x, y) in [(-1, 0), (0, -1), (2, 0), (0, 2), (100, 100)].iter() {
            assert_eq!(Stone::Boundary, b.get(*x, *y));
        }
        assert_eq!(W, b.get(0, 0));
        assert_eq!(B, b.get(1, 0));
    }

    #[test]
    fn writes_outside_are_ignored() {
        let b = board(vec![vec![W, B], vec![E, E]]);

        for (x, y) in [(-1, 0), (0, -1), (2, 0), (0, 2)].iter() {
            assert_eq!(b, b.set(*x, *y, B));
        }
    }

    #[test]
    fn set_leaves_original_untouched() {
        let b = board(vec![vec![E, E], vec![E, E]]);
        let next = b.set(1, 1, W);

        assert_eq!(E, b.get(1, 1));
        assert_eq!(W, next.get(1, 1));
    }

    #[test]
    fn rejects_ragged_rows() {
        assert!(Board::from_rows(vec![vec![W, B], vec![E]]).is_err());
        assert!(Board::from_rows(vec![vec![Stone::Boundary]]).is_err());
        assert!(serde_json::from_str::<Board>("[[0,1],[2]]").is_err());
    }

    #[test]
    fn equality() {
        let b = board(vec![vec![W, B], vec![E, E]]);
        let cases = vec![
            (board(vec![vec![W, B], vec![E, E]]), true),
            (board(vec![vec![W, B], vec![E, B]]), false),
            (board(vec![vec![W, B]]), false),
            (board(vec![vec![W, B, E], vec![E, E, E]]), false),
        ];

        for (other, expect) in cases {
            assert_eq!(expect, b.equals(&other), "{:?} vs {:?}", b, other);
        }
    }

    #[test]
    fn counts_liberties() {
        let cases = vec![
            (board(vec![vec![W, B], vec![E, E]]), (0, 0), 1),
            (board(vec![vec![W, B], vec![E, E]]), (1, 0), 1),
            (board(vec![vec![W, B], vec![E, B]]), (1, 0), 1),
            (board(vec![vec![W, B], vec![W, B]]), (1, 0), 0),
            (
                board(vec![vec![B, B, E], vec![B, B, B], vec![E, B, B]]),
                (1, 1),
                2,
            ),
        ];

        for (b, (x, y), expect) in cases {
            assert_eq!(expect, b.liberties(x, y), "liberties at ({}, {})", x, y);
        }
    }

    #[test]
    fn shared_liberty_is_counted_once() {
        // both black stones touch the empty point in the middle
        let b = board(vec![vec![B, E, B], vec![W, W, W]]);

        assert_eq!(1, b.liberties(0, 0));
        assert_eq!(1, b.liberties(2, 0));
    }

    #[test]
    fn captures_whole_group() {
        let b = board(vec![vec![W, B], vec![E, E]]);
        let (after, captures) = b.capture(0, 0);
        assert_eq!(board(vec![vec![E, B], vec![E, E]]), after);
        assert_eq!(1, captures);

        let b = board(vec![vec![W, B, E], vec![W, W, B], vec![W, W, W]]);
        let (after, captures) = b.capture(1, 1);
        assert_eq!(board(vec![vec![E, B, E], vec![E, E, B], vec![E, E, E]]), after);
        assert_eq!(6, captures);
    }

    #[test]
    fn capture_of_empty_point_is_noop() {
        let b = board(vec![vec![E, B], vec![E, E]]);

        assert_eq!((b.clone(), 0), b.capture(0, 0));
    }

    #[test]
    fn play_on_stone_is_occupied() {
        let b = board(vec![vec![W, B], vec![E, E]]);

        assert_eq!(Err(GameError::OccupiedCell), b.play(0, 0, B));
        assert_eq!(Err(GameError::OccupiedCell), b.play(5, 5, B));
    }

    #[test]
    fn play_without_liberties_is_suicide() {
        let b = board(vec![vec![E, B], vec![B, E]]);
        assert_eq!(Err(GameError::Suicide), b.play(0, 0, W));

        let b = board(vec![vec![E, B, E], vec![B, E, B], vec![W, W, W]]);
        assert_eq!(Err(GameError::Suicide), b.play(0, 0, W));
    }

    #[test]
    fn play_captures_surrounded_group() {
        let b = board(vec![vec![W, B, E], vec![W, W, B], vec![W, W, W]]);

        let (after, captures) = b.play(2, 0, W).unwrap();

        assert_eq!(board(vec![vec![W, E, W], vec![W, W, E], vec![W, W, W]]), after);
        assert_eq!(2, captures);
        // the original snapshot is unchanged
        assert_eq!(B, b.get(1, 0));
    }

    #[test]
    fn capturing_makes_otherwise_suicidal_play_legal() {
        let b = board(vec![vec![E, W, B], vec![W, B, E], vec![B, E, E]]);

        let (after, captures) = b.play(0, 0, B).unwrap();

        assert_eq!(board(vec![vec![B, E, B], vec![E, B, E], vec![B, E, E]]), after);
        assert_eq!(2, captures);
    }

    #[test]
    fn captures_in_all_four_directions() {
        let b = board(vec![
            vec![E, E, W, E, E],
            vec![E, W, B, W, E],
            vec![W, B, E, B, W],
            vec![E, W, B, W, E],
            vec![E, E, W, E, E],
        ]);

        let (after, captures) = b.play(2, 2, W).unwrap();

        assert_eq!(4, captures);
        for (x, y) in [(2, 1), (1, 2), (3, 2), (2, 3)].iter() {
            assert_eq!(E, after.get(*x, *y));
        }
        assert_eq!(4, after.liberties(2, 2));
        assert_eq!(0, after.liberties(-1, 3));
    }

    #[test]
    fn renders_text_grid() {
        let b = board(vec![vec![B, E], vec![E, W]]);

        assert_eq!("    A B\n 1  X .\n 2  . O\n", b.to_string());
    }
}
