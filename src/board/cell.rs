/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use super::Direction;

/// A single square of the board.
///
/// Paths are never written directly; the board keeps both sides of every edge in sync.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Cell {
    /// Whether a pawn may leave this cell in each [`Direction`].
    paths: [bool; Direction::COUNT],

    /// Index of the pawn standing here, if any.
    pub(crate) pawn: Option<usize>,
}

impl Cell {
    /// A cell that is open in every direction and holds no pawn.
    pub(crate) const OPEN: Self = Self {
        paths: [true; Direction::COUNT],
        pawn: None,
    };

    /// Returns `true` if a pawn may leave this cell towards `direction`.
    #[inline(always)]
    pub const fn is_open(&self, direction: Direction) -> bool {
        self.paths[direction.index()]
    }

    #[inline(always)]
    pub(crate) fn set_open(&mut self, direction: Direction, open: bool) {
        self.paths[direction.index()] = open;
    }

    /// Index of the pawn on this cell, if any.
    #[inline(always)]
    pub const fn pawn(&self) -> Option<usize> {
        self.pawn
    }

    #[inline(always)]
    pub const fn is_empty(&self) -> bool {
        self.pawn.is_none()
    }
}
