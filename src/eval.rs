/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use crate::{Board, Distances, Score};

/// Encapsulates the logic of scoring a position.
///
/// A position is scored by how far ahead a pawn is in the race to its goal:
/// the shortest path of its closest opponent minus its own shortest path.
/// During a negamax search, positions must be evaluated from the perspective of the pawn that just acted,
/// so a positive score is good for that pawn.
///
/// The distance fields must already be up to date with `board`.
#[derive(Debug, Clone, Copy)]
pub struct Evaluator<'a> {
    board: &'a Board,
    distances: &'a Distances,
}

impl<'a> Evaluator<'a> {
    #[inline(always)]
    pub fn new(board: &'a Board, distances: &'a Distances) -> Self {
        Self { board, distances }
    }

    /// Evaluate this position from the current player's perspective.
    #[inline(always)]
    pub fn eval(&self) -> Score {
        self.eval_for(self.board.current_player())
    }

    /// Evaluate this position from `pawn`'s perspective.
    ///
    /// A positive/high number is good for `pawn`, while a negative number is better for its closest opponent.
    /// A score of 0 is an even race.
    #[inline(always)]
    pub fn eval_for(&self, pawn: usize) -> Score {
        Score::from(self.opponent_distance(pawn)) - Score::from(self.own_distance(pawn))
    }

    /// Shortest path of `pawn` to its goal.
    #[inline(always)]
    pub fn own_distance(&self, pawn: usize) -> u16 {
        self.distances.shortest_path_len(self.board, pawn)
    }

    /// Shortest path among all of `pawn`'s opponents.
    #[inline(always)]
    pub fn opponent_distance(&self, pawn: usize) -> u16 {
        self.distances.best_opponent(self.board, pawn)
    }
}

impl fmt::Display for Evaluator<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let current = self.board.current_player();

        for pawn in 0..self.board.num_players() {
            let marker = if pawn == current { '*' } else { ' ' };
            writeln!(
                f,
                "{marker} Player {pawn}: shortest path {}",
                self.own_distance(pawn)
            )?;
        }

        write!(f, "Score: {}", self.eval())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Action, Coord, Wall};

    #[test]
    fn test_even_start() {
        let board = Board::default();
        let distances = Distances::new(&board);
        let eval = Evaluator::new(&board, &distances);

        assert_eq!(eval.eval(), Score::EVEN);
        assert_eq!(eval.eval_for(1), Score::EVEN);
    }

    #[test]
    fn test_eval_is_relative_to_pawn() {
        let mut board = Board::default();
        board.do_action(Action::MovePawn {
            from: Coord::new(8, 4),
            to: Coord::new(7, 4),
        });
        board.put_wall(Wall::horizontal(0, 3));

        let distances = Distances::new(&board);
        let eval = Evaluator::new(&board, &distances);

        // Pawn 0 is one step closer, pawn 1 has a wall in front of it
        assert_eq!(eval.own_distance(0), 7);
        assert_eq!(eval.own_distance(1), 9);
        assert_eq!(eval.eval_for(0), Score(2));
        assert_eq!(eval.eval_for(1), Score(-2));
    }
}
