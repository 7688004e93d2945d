/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use super::Coord;

/// The edge of the board a pawn is racing towards.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Goal {
    /// Every cell of this row.
    Row(i8),

    /// Every cell of this column.
    Col(i8),
}

impl Goal {
    /// Derives the goal of a pawn that starts at `start` on a `rows × cols` board.
    ///
    /// Pawns race to the edge opposite of the one they start on.
    pub fn opposite_of(start: Coord, rows: usize, cols: usize) -> Self {
        let last_row = rows as i8 - 1;
        let last_col = cols as i8 - 1;

        if start.row == 0 {
            Self::Row(last_row)
        } else if start.row == last_row {
            Self::Row(0)
        } else if start.col == last_col {
            Self::Col(0)
        } else {
            Self::Col(last_col)
        }
    }

    /// Returns `true` if `coord` is one of the goal cells.
    #[inline(always)]
    pub const fn contains(&self, coord: Coord) -> bool {
        match *self {
            Self::Row(row) => coord.row == row,
            Self::Col(col) => coord.col == col,
        }
    }

    /// Iterates over every goal cell on a `rows × cols` board.
    pub fn cells(self, rows: usize, cols: usize) -> impl Iterator<Item = Coord> {
        let len = match self {
            Self::Row(_) => cols,
            Self::Col(_) => rows,
        };

        (0..len as i8).map(move |i| match self {
            Self::Row(row) => Coord::new(row, i),
            Self::Col(col) => Coord::new(i, col),
        })
    }
}

/// A player's token, as stored on the board.
///
/// Occupancy lives on both the pawn (its coordinate) and the cell (the pawn's index),
/// and the two are only ever updated together by the board.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Pawn {
    pub(crate) coord: Coord,
    pub(crate) walls: u8,
    goal: Goal,
}

impl Pawn {
    pub(crate) const fn new(coord: Coord, walls: u8, goal: Goal) -> Self {
        Self { coord, walls, goal }
    }

    /// Current location of this pawn.
    #[inline(always)]
    pub const fn coord(&self) -> Coord {
        self.coord
    }

    /// Number of walls this pawn may still place.
    #[inline(always)]
    pub const fn walls(&self) -> u8 {
        self.walls
    }

    #[inline(always)]
    pub const fn goal(&self) -> Goal {
        self.goal
    }

    /// Returns `true` if this pawn stands on one of its goal cells.
    #[inline(always)]
    pub const fn has_arrived(&self) -> bool {
        self.goal.contains(self.coord)
    }
}
