/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

/// Actions a player can take on their turn.
mod action;

/// The board itself and the configuration used to set it up.
#[allow(clippy::module_inception)]
mod board;

/// Squares of the board.
mod cell;

/// Coordinates and directions.
mod coord;

/// Pawn move generation and wall legality.
mod movegen;

/// Pawns and their goals.
mod pawn;

/// Canonical serialization of a board.
mod state;

/// Walls and their orientations.
mod wall;

pub use action::*;
pub use board::*;
pub use cell::*;
pub use coord::*;
pub use movegen::*;
pub use pawn::*;
pub use state::*;
pub use wall::*;
