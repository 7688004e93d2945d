/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

/// Board state, pawn moves and wall legality.
mod board;

/// Command-line arguments and the commands understood by the engine.
mod cli;

/// Per-pawn distance to goal.
mod distance;

/// Code related to the engine's functionality, such as user input handling.
mod engine;

/// Evaluation of positions.
mod eval;

/// Numerical scores of positions.
mod score;

/// Main engine logic; all search related code.
mod search;

/// Memo table of search results.
mod ttable;

pub use board::*;
pub use cli::*;
pub use distance::*;
pub use engine::*;
pub use eval::*;
pub use score::*;
pub use search::*;
pub use ttable::*;
