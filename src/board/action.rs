/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{fmt, str::FromStr};

use anyhow::{bail, Result};

use super::{Coord, Wall};

/// Something a player can do on their turn.
///
/// Every action has an inverse that needs no extra state:
/// a pawn move is undone by moving back to `from`, and a wall is undone by removing that same wall.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Move the current player's pawn.
    MovePawn { from: Coord, to: Coord },

    /// Place one of the current player's walls.
    PlaceWall(Wall),
}

impl Action {
    /// Returns `true` if this action moves a pawn.
    #[inline(always)]
    pub const fn is_pawn_move(&self) -> bool {
        matches!(self, Self::MovePawn { .. })
    }
}

impl From<Wall> for Action {
    #[inline(always)]
    fn from(value: Wall) -> Self {
        Self::PlaceWall(value)
    }
}

impl FromStr for Action {
    type Err = anyhow::Error;

    /// Parses either a pawn move (`e9-e8`) or a wall placement (`e5h`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            bail!("Cannot parse an action from an empty string");
        }

        if let Some((from, to)) = s.split_once('-') {
            return Ok(Self::MovePawn {
                from: from.parse()?,
                to: to.parse()?,
            });
        }

        Ok(Self::PlaceWall(s.parse()?))
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MovePawn { from, to } => write!(f, "{from}-{to}"),
            Self::PlaceWall(wall) => write!(f, "{wall}"),
        }
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MovePawn { from, to } => write!(f, "Move{{{from:?} -> {to:?}}}"),
            Self::PlaceWall(wall) => write!(f, "PlaceWall<{wall}>"),
        }
    }
}
