/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{fmt, ops::Add, str::FromStr};

use anyhow::{bail, Context, Result};

/// One of the four orthogonal directions a pawn can travel in.
///
/// Rows grow towards the [`Direction::South`], columns grow towards the [`Direction::East`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
#[repr(u8)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    /// Number of directions.
    pub const COUNT: usize = 4;

    /// All directions, in the order they are scanned during move generation.
    pub const ALL: [Self; Self::COUNT] = [Self::North, Self::South, Self::East, Self::West];

    /// Returns the direction pointing the other way.
    #[inline(always)]
    pub const fn opposite(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::South => Self::North,
            Self::East => Self::West,
            Self::West => Self::East,
        }
    }

    /// Unit `(row, col)` offset of this direction.
    #[inline(always)]
    pub const fn delta(self) -> (i8, i8) {
        match self {
            Self::North => (-1, 0),
            Self::South => (1, 0),
            Self::East => (0, 1),
            Self::West => (0, -1),
        }
    }

    /// Index of this direction, usable to index per-direction arrays.
    #[inline(always)]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// The two directions perpendicular to `self`.
    #[inline(always)]
    pub const fn orthogonal(self) -> [Self; 2] {
        match self {
            Self::North | Self::South => [Self::East, Self::West],
            Self::East | Self::West => [Self::North, Self::South],
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = match self {
            Self::North => 'N',
            Self::South => 'S',
            Self::East => 'E',
            Self::West => 'W',
        };
        write!(f, "{c}")
    }
}

/// A `(row, col)` location on the board.
///
/// Row `0` is the top edge of the board and column `0` is the left edge.
///
/// The textual form is a column letter followed by a 1-based row number,
/// so the top-left cell is `a1` and the centre of a standard board is `e5`:
/// ```text
///    a  b  c  d  e  f  g  h  i
/// 1  .  .  .  .  .  .  .  .  .
/// 2  .  .  .  .  .  .  .  .  .
/// ...
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Coord {
    pub row: i8,
    pub col: i8,
}

impl Coord {
    /// Creates a new [`Coord`] at `row` and `col`.
    #[inline(always)]
    pub const fn new(row: i8, col: i8) -> Self {
        Self { row, col }
    }

    /// Returns the coordinate one step away in `direction`.
    ///
    /// The result may lie outside of the board; callers check with `Board::in_range`.
    #[inline(always)]
    pub const fn step(self, direction: Direction) -> Self {
        let (dr, dc) = direction.delta();
        Self::new(self.row + dr, self.col + dc)
    }

    /// Returns `true` if `self` lies within a `rows × cols` grid.
    #[inline(always)]
    pub const fn within(self, rows: usize, cols: usize) -> bool {
        self.row >= 0 && self.col >= 0 && (self.row as usize) < rows && (self.col as usize) < cols
    }

    /// Row-major index of this coordinate on a grid with `cols` columns.
    #[inline(always)]
    pub const fn index(self, cols: usize) -> usize {
        self.row as usize * cols + self.col as usize
    }

    /// Inverse of [`Coord::index`].
    #[inline(always)]
    pub const fn from_index(index: usize, cols: usize) -> Self {
        Self::new((index / cols) as i8, (index % cols) as i8)
    }
}

impl Add<Direction> for Coord {
    type Output = Self;

    #[inline(always)]
    fn add(self, rhs: Direction) -> Self::Output {
        self.step(rhs)
    }
}

impl FromStr for Coord {
    type Err = anyhow::Error;

    /// Parses a coordinate such as `e5` or `c12`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let mut chars = s.chars();

        let Some(file) = chars.next() else {
            bail!("Cannot parse a coordinate from an empty string");
        };

        if !file.is_ascii_alphabetic() {
            bail!("Coordinate {s:?} must start with a column letter");
        }

        let col = (file.to_ascii_lowercase() as u8 - b'a') as i8;

        let row = chars
            .as_str()
            .parse::<u8>()
            .with_context(|| format!("Coordinate {s:?} must end with a row number"))?;

        if row == 0 || row > i8::MAX as u8 {
            bail!("Row of coordinate {s:?} must be in [1, {}]", i8::MAX);
        }

        Ok(Self::new(row as i8 - 1, col))
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let file = (b'a' + self.col as u8) as char;
        write!(f, "{file}{}", self.row + 1)
    }
}

impl fmt::Debug for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self} ({}, {})", self.row, self.col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opposites() {
        for dir in Direction::ALL {
            assert_ne!(dir, dir.opposite());
            assert_eq!(dir, dir.opposite().opposite());

            let (dr, dc) = dir.delta();
            let (or, oc) = dir.opposite().delta();
            assert_eq!((dr + or, dc + oc), (0, 0));
        }
    }

    #[test]
    fn test_step_round_trips() {
        let c = Coord::new(4, 4);
        for dir in Direction::ALL {
            assert_eq!(c + dir + dir.opposite(), c);
        }
        assert_eq!(c + Direction::North, Coord::new(3, 4));
        assert_eq!(c + Direction::East, Coord::new(4, 5));
    }

    #[test]
    fn test_within() {
        assert!(Coord::new(0, 0).within(9, 9));
        assert!(Coord::new(8, 8).within(9, 9));
        assert!(!Coord::new(-1, 0).within(9, 9));
        assert!(!Coord::new(0, 9).within(9, 9));
    }

    #[test]
    fn test_parse_coord() {
        assert_eq!("a1".parse::<Coord>().unwrap(), Coord::new(0, 0));
        assert_eq!("e9".parse::<Coord>().unwrap(), Coord::new(8, 4));
        assert_eq!("C12".parse::<Coord>().unwrap(), Coord::new(11, 2));
        assert_eq!(Coord::new(8, 4).to_string(), "e9");

        assert!("".parse::<Coord>().is_err());
        assert!("9e".parse::<Coord>().is_err());
        assert!("e0".parse::<Coord>().is_err());
        assert!("e".parse::<Coord>().is_err());
    }
}
