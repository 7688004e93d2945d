/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{fmt, str::FromStr};

use anyhow::{bail, Result};

use super::{Coord, Direction};

/// Which way a [`Wall`] lies.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub enum Orientation {
    /// Lies between two rows, blocking North/South travel.
    Horizontal,

    /// Lies between two columns, blocking East/West travel.
    Vertical,
}

impl Orientation {
    /// Both orientations, in the order walls are scanned during generation.
    pub const ALL: [Self; 2] = [Self::Vertical, Self::Horizontal];

    #[inline(always)]
    pub const fn char(&self) -> char {
        match self {
            Self::Horizontal => 'h',
            Self::Vertical => 'v',
        }
    }
}

/// A wall spanning two cells.
///
/// The `anchor` is the top-left cell of the 2x2 block the wall sits in the middle of:
/// ```text
///   Horizontal at a1        Vertical at a1
///
///   a1   b1                 a1 | b1
///   =========                  |
///   a2   b2                 a2 | b2
/// ```
/// A horizontal wall closes the South side of `anchor` and of its East neighbour.
/// A vertical wall closes the East side of `anchor` and of its South neighbour.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Wall {
    pub anchor: Coord,
    pub orientation: Orientation,
}

impl Wall {
    #[inline(always)]
    pub const fn new(anchor: Coord, orientation: Orientation) -> Self {
        Self {
            anchor,
            orientation,
        }
    }

    #[inline(always)]
    pub const fn horizontal(row: i8, col: i8) -> Self {
        Self::new(Coord::new(row, col), Orientation::Horizontal)
    }

    #[inline(always)]
    pub const fn vertical(row: i8, col: i8) -> Self {
        Self::new(Coord::new(row, col), Orientation::Vertical)
    }

    /// The two cells whose paths this wall closes, both in the returned direction.
    #[inline(always)]
    pub const fn cells(&self) -> ([Coord; 2], Direction) {
        let a = self.anchor;
        match self.orientation {
            Orientation::Horizontal => ([a, Coord::new(a.row, a.col + 1)], Direction::South),
            Orientation::Vertical => ([a, Coord::new(a.row + 1, a.col)], Direction::East),
        }
    }

    /// Returns `true` if this wall may be anchored on a `rows × cols` board.
    #[inline(always)]
    pub const fn fits(&self, rows: usize, cols: usize) -> bool {
        self.anchor.within(rows - 1, cols - 1)
    }

    /// Returns `true` if `self` and `other` cannot both be on the board.
    ///
    /// Parallel walls collide when they cover a common cell edge,
    /// perpendicular walls collide only when they cross at the same anchor.
    pub fn collides(&self, other: &Self) -> bool {
        if self.orientation == other.orientation {
            let (ours, _) = self.cells();
            let (theirs, _) = other.cells();
            ours.iter().any(|c| theirs.contains(c))
        } else {
            self.anchor == other.anchor
        }
    }
}

impl FromStr for Wall {
    type Err = anyhow::Error;

    /// Parses a wall such as `e5h` or `c3v`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let Some(last) = s.chars().last() else {
            bail!("Cannot parse a wall from an empty string");
        };

        let orientation = match last.to_ascii_lowercase() {
            'h' => Orientation::Horizontal,
            'v' => Orientation::Vertical,
            _ => bail!("Wall {s:?} must end with an orientation of 'h' or 'v'"),
        };

        let anchor = s[..s.len() - 1].parse()?;

        Ok(Self::new(anchor, orientation))
    }
}

impl fmt::Display for Wall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.anchor, self.orientation.char())
    }
}

impl fmt::Debug for Wall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Wall<{self}>")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parallel_collisions() {
        let w = Wall::horizontal(3, 3);

        assert!(w.collides(&Wall::horizontal(3, 3)));
        assert!(w.collides(&Wall::horizontal(3, 2)));
        assert!(w.collides(&Wall::horizontal(3, 4)));
        assert!(!w.collides(&Wall::horizontal(3, 5)));
        assert!(!w.collides(&Wall::horizontal(3, 1)));
        assert!(!w.collides(&Wall::horizontal(4, 3)));

        let v = Wall::vertical(3, 3);
        assert!(v.collides(&Wall::vertical(2, 3)));
        assert!(v.collides(&Wall::vertical(4, 3)));
        assert!(!v.collides(&Wall::vertical(5, 3)));
        assert!(!v.collides(&Wall::vertical(3, 4)));
    }

    #[test]
    fn test_crossing_collisions() {
        let w = Wall::horizontal(3, 3);
        assert!(w.collides(&Wall::vertical(3, 3)));
        assert!(!w.collides(&Wall::vertical(3, 4)));
        assert!(!w.collides(&Wall::vertical(2, 3)));
    }

    #[test]
    fn test_fits() {
        assert!(Wall::horizontal(7, 7).fits(9, 9));
        assert!(!Wall::horizontal(8, 0).fits(9, 9));
        assert!(!Wall::vertical(0, 8).fits(9, 9));
    }

    #[test]
    fn test_parse_wall() {
        assert_eq!("e5h".parse::<Wall>().unwrap(), Wall::horizontal(4, 4));
        assert_eq!("a1V".parse::<Wall>().unwrap(), Wall::vertical(0, 0));
        assert_eq!(Wall::vertical(2, 1).to_string(), "b3v");
        assert!("e5x".parse::<Wall>().is_err());
        assert!("h".parse::<Wall>().is_err());
    }
}
