/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use arrayvec::ArrayVec;

use super::{Action, Board, Coord, Direction, Orientation, Wall};

/// Maximum number of destinations a pawn can have from a single cell.
///
/// Each direction yields either one step, one straight jump, or up to two diagonal jumps.
pub const MAX_NUM_MOVES: usize = 8;

/// Destinations a pawn may move to.
pub type MoveList = ArrayVec<Coord, MAX_NUM_MOVES>;

impl Board {
    /// Returns `true` if `coord` is on the board and no pawn other than `pawn` stands there.
    #[inline(always)]
    fn is_free_for(&self, pawn: usize, coord: Coord) -> bool {
        self.in_range(coord) && !matches!(self.cell(coord).pawn(), Some(p) if p != pawn)
    }

    /// Generates every cell pawn `pawn` could move to if it stood on `from`.
    ///
    /// A pawn steps to any orthogonal neighbour it has an open path to.
    /// If that neighbour holds another pawn, it jumps straight over it instead,
    /// provided the cell beyond is reachable and free.
    /// Otherwise it may step diagonally onto the free cells beside the blocking pawn.
    /// Diagonals are only offered when the straight jump is unavailable.
    ///
    /// `pawn` itself never counts as an obstacle, so this also answers
    /// where it could go from cells it does not currently stand on.
    ///
    /// # Panics
    /// If `from` is not on the board.
    pub fn valid_moves_from(&self, pawn: usize, from: Coord) -> MoveList {
        assert!(self.in_range(from), "Cell {from:?} is outside of the board");

        let mut moves = MoveList::new();
        let origin = self.cell(from);

        for dir in Direction::ALL {
            if !origin.is_open(dir) {
                continue;
            }

            let neighbour = from + dir;
            if self.is_free_for(pawn, neighbour) {
                moves.push(neighbour);
                continue;
            }

            // Someone is in the way
            let blocker = self.cell(neighbour);
            let beyond = neighbour + dir;
            if blocker.is_open(dir) && self.is_free_for(pawn, beyond) {
                moves.push(beyond);
                continue;
            }

            for side in dir.orthogonal() {
                let diagonal = neighbour + side;
                // Two blockers can share a diagonal
                if blocker.is_open(side)
                    && self.is_free_for(pawn, diagonal)
                    && !moves.contains(&diagonal)
                {
                    moves.push(diagonal);
                }
            }
        }

        moves
    }

    /// Generates every cell pawn `pawn` may move to from where it stands.
    #[inline(always)]
    pub fn valid_moves(&self, pawn: usize) -> MoveList {
        self.valid_moves_from(pawn, self.pawn(pawn).coord())
    }

    /// Generates every pawn move available to the current player.
    pub fn pawn_actions(&self) -> impl Iterator<Item = Action> + '_ {
        let from = self.current_pawn().coord();
        self.valid_moves(self.current_player())
            .into_iter()
            .map(move |to| Action::MovePawn { from, to })
    }

    /// Returns `true` if pawn `pawn` has some path to its goal, jumping over other pawns where needed.
    pub fn can_reach_goal(&self, pawn: usize) -> bool {
        let start = self.pawn(pawn).coord();
        let goal = self.pawn(pawn).goal();

        let mut visited = vec![false; self.area()];
        let mut stack = vec![start];
        visited[start.index(self.cols())] = true;

        while let Some(coord) = stack.pop() {
            if goal.contains(coord) {
                return true;
            }

            for next in self.valid_moves_from(pawn, coord) {
                let seen = &mut visited[next.index(self.cols())];
                if !*seen {
                    *seen = true;
                    stack.push(next);
                }
            }
        }

        false
    }

    /// Returns `true` if the current player may place `wall`.
    ///
    /// The player must have a wall left, the wall must fit on the board without
    /// colliding with another wall, and every pawn must still be able to reach its goal afterwards.
    ///
    /// The board is left exactly as it was found.
    pub fn can_put_wall(&mut self, wall: Wall) -> bool {
        if self.current_pawn().walls() == 0 || !wall.fits(self.rows(), self.cols()) {
            return false;
        }

        if self.walls().any(|placed| placed.collides(&wall)) {
            return false;
        }

        let key = self.take_key();
        self.put_wall(wall);
        let reachable = (0..self.num_players()).all(|pawn| self.can_reach_goal(pawn));
        self.remove_wall(wall);
        self.restore_key(key);

        reachable
    }

    /// Generates every wall the current player may place.
    ///
    /// Anchors are scanned row by row, trying a vertical wall before a horizontal one at each.
    pub fn legal_walls(&mut self) -> Vec<Wall> {
        if self.current_pawn().walls() == 0 {
            return Vec::new();
        }

        let mut walls = Vec::new();
        for row in 0..self.rows() as i8 - 1 {
            for col in 0..self.cols() as i8 - 1 {
                for orientation in Orientation::ALL {
                    let wall = Wall::new(Coord::new(row, col), orientation);
                    if self.can_put_wall(wall) {
                        walls.push(wall);
                    }
                }
            }
        }

        walls
    }

    /// Generates every action available to the current player: pawn moves first, then walls.
    pub fn legal_actions(&mut self) -> Vec<Action> {
        let mut actions: Vec<Action> = self.pawn_actions().collect();
        actions.extend(self.legal_walls().into_iter().map(Action::PlaceWall));
        actions
    }

    /// Returns `true` if the current player may perform `action`.
    pub fn is_legal(&mut self, action: Action) -> bool {
        match action {
            Action::MovePawn { from, to } => {
                self.current_pawn().coord() == from && self.valid_moves(self.current_player()).contains(&to)
            }

            Action::PlaceWall(wall) => self.can_put_wall(wall),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BoardConfig;

    fn sorted(moves: MoveList) -> Vec<Coord> {
        let mut moves = moves.to_vec();
        moves.sort();
        moves
    }

    fn coords(strs: &[&str]) -> Vec<Coord> {
        let mut coords: Vec<Coord> = strs.iter().map(|s| s.parse().unwrap()).collect();
        coords.sort();
        coords
    }

    #[test]
    fn test_opening_moves() {
        let board = Board::default();
        assert_eq!(sorted(board.valid_moves(0)), coords(&["d9", "e8", "f9"]));
        assert_eq!(sorted(board.valid_moves(1)), coords(&["d1", "e2", "f1"]));
    }

    #[test]
    fn test_straight_jump() {
        let mut board = Board::default();
        board.place_pawn(0, "e5".parse().unwrap());
        board.place_pawn(1, "e4".parse().unwrap());

        assert_eq!(
            sorted(board.valid_moves(0)),
            coords(&["d5", "e3", "e6", "f5"])
        );
    }

    #[test]
    fn test_diagonal_jump_behind_wall() {
        let mut board = Board::default();
        board.place_pawn(0, "e5".parse().unwrap());
        board.place_pawn(1, "e4".parse().unwrap());

        // Close the path beyond the other pawn
        board.put_wall(Wall::horizontal(2, 4));

        assert_eq!(
            sorted(board.valid_moves(0)),
            coords(&["d4", "d5", "e6", "f4", "f5"])
        );
    }

    #[test]
    fn test_diagonal_jump_at_edge() {
        let mut board = Board::default();
        board.place_pawn(1, "e1".parse().unwrap());
        board.place_pawn(0, "e2".parse().unwrap());

        assert_eq!(
            sorted(board.valid_moves(0)),
            coords(&["d1", "d2", "e3", "f1", "f2"])
        );
    }

    #[test]
    fn test_diagonal_blocked_by_walls() {
        let mut board = Board::default();
        board.place_pawn(0, "e5".parse().unwrap());
        board.place_pawn(1, "e4".parse().unwrap());
        board.put_wall(Wall::horizontal(2, 4));
        // Wall on the East side of e4
        board.put_wall(Wall::vertical(2, 4));

        assert_eq!(sorted(board.valid_moves(0)), coords(&["d4", "d5", "e6", "f5"]));
    }

    #[test]
    fn test_jump_walled_on_every_side() {
        let mut board = Board::default();
        board.place_pawn(0, "e5".parse().unwrap());
        board.place_pawn(1, "e4".parse().unwrap());
        // Behind e4, then both of its sides
        board.put_wall("d3h".parse().unwrap());
        board.put_wall("e3v".parse().unwrap());
        board.put_wall("d4v".parse().unwrap());

        // The last wall also closes d5, so only the steps away from e4 remain
        assert_eq!(sorted(board.valid_moves(0)), coords(&["e6", "f5"]));
    }

    #[test]
    fn test_shared_diagonal_is_listed_once() {
        let mut board = Board::new(BoardConfig {
            players: 4,
            ..Default::default()
        });
        board.place_pawn(0, "e5".parse().unwrap());
        board.place_pawn(1, "e4".parse().unwrap());
        board.place_pawn(2, "f5".parse().unwrap());
        board.put_wall("e3h".parse().unwrap());
        board.put_wall("f5v".parse().unwrap());

        let moves = board.valid_moves(0);
        assert_eq!(sorted(moves.clone()), coords(&["d4", "d5", "e6", "f4", "f6"]));
        assert_eq!(moves.len(), 5);
        assert_eq!(board.pawn_actions().count(), 5);
    }

    #[test]
    fn test_walls_block_steps() {
        let mut board = Board::default();
        board.put_wall(Wall::horizontal(7, 4));
        assert_eq!(sorted(board.valid_moves(0)), coords(&["d9", "f9"]));
    }

    #[test]
    fn test_moves_are_symmetric_without_pawns_in_between() {
        let mut board = Board::default();
        board.put_wall(Wall::vertical(3, 3));
        board.put_wall(Wall::horizontal(5, 5));

        let pawn = 0;
        for index in 0..board.area() {
            let from = Coord::from_index(index, board.cols());
            if !board.cell(from).is_empty() {
                continue;
            }

            for to in board.valid_moves_from(pawn, from) {
                let adjacent = (from.row - to.row).abs() + (from.col - to.col).abs() == 1;
                if adjacent {
                    assert!(
                        board.valid_moves_from(pawn, to).contains(&from),
                        "{from:?} -> {to:?} is not reversible"
                    );
                }
            }
        }
    }

    #[test]
    fn test_wall_collisions_are_illegal() {
        let mut board = Board::default();
        board.put_wall(Wall::horizontal(4, 4));

        assert!(!board.can_put_wall(Wall::horizontal(4, 4)));
        assert!(!board.can_put_wall(Wall::horizontal(4, 3)));
        assert!(!board.can_put_wall(Wall::horizontal(4, 5)));
        assert!(!board.can_put_wall(Wall::vertical(4, 4)));
        assert!(board.can_put_wall(Wall::horizontal(4, 6)));
        assert!(board.can_put_wall(Wall::vertical(3, 4)));
    }

    #[test]
    fn test_walls_out_of_range_are_illegal() {
        let mut board = Board::default();
        assert!(!board.can_put_wall(Wall::horizontal(8, 0)));
        assert!(!board.can_put_wall(Wall::vertical(0, 8)));
        assert!(!board.can_put_wall(Wall::vertical(-1, 0)));
    }

    #[test]
    fn test_no_walls_left() {
        let mut board = Board::default();
        board.set_walls(0, 0);
        assert!(!board.can_put_wall(Wall::horizontal(4, 4)));
        assert!(board.legal_walls().is_empty());
    }

    #[test]
    fn test_walls_cannot_seal_a_pawn_in() {
        let mut board = Board::default();
        // Leave the top pawn a single exit out of e1-e2, to the South of e2
        board.put_wall(Wall::vertical(0, 3));
        board.put_wall(Wall::vertical(0, 4));
        assert!(board.can_reach_goal(1));

        let before = board.state_key().clone();
        assert!(!board.can_put_wall(Wall::horizontal(1, 3)));
        assert!(!board.can_put_wall(Wall::horizontal(1, 4)));
        assert!(board.can_put_wall(Wall::horizontal(2, 4)));
        assert_eq!(board.state_key(), &before);
    }

    #[test]
    fn test_can_put_wall_restores_board() {
        let mut board = Board::default();
        let before = board.state_key().clone();

        for wall in board.legal_walls() {
            assert!(board.can_put_wall(wall));
        }

        assert_eq!(board.state_key(), &before);
        assert_eq!(board.walls().count(), 0);
    }

    #[test]
    fn test_opening_wall_count() {
        let mut board = Board::default();
        assert_eq!(board.legal_walls().len(), 2 * 8 * 8);
        assert_eq!(board.legal_actions().len(), 3 + 2 * 8 * 8);
    }

    #[test]
    fn test_wall_scan_order() {
        let mut board = Board::default();
        let walls = board.legal_walls();
        assert_eq!(walls[0], Wall::vertical(0, 0));
        assert_eq!(walls[1], Wall::horizontal(0, 0));
        assert_eq!(walls[2], Wall::vertical(0, 1));
    }

    #[test]
    fn test_is_legal() {
        let mut board = Board::default();
        assert!(board.is_legal("e9-e8".parse().unwrap()));
        assert!(!board.is_legal("e9-e7".parse().unwrap()));
        assert!(!board.is_legal("e1-e2".parse().unwrap()));
        assert!(board.is_legal("e5h".parse().unwrap()));
        assert!(!board.is_legal("i5h".parse().unwrap()));
    }

    #[test]
    fn test_four_player_reachability() {
        let mut board = Board::new(BoardConfig {
            players: 4,
            ..Default::default()
        });

        for pawn in 0..4 {
            assert!(board.can_reach_goal(pawn));
        }
        assert_eq!(board.legal_walls().len(), 2 * 8 * 8);
    }
}
