/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{
    collections::{HashMap, VecDeque},
    fmt,
    ops::{Deref, Index},
    rc::Rc,
};

use crate::{Board, Coord, Direction, StateKey};

/// Distance of a cell from which the goal cannot be reached.
///
/// Kept small enough that differences of distances always fit comfortably inside a [`crate::Score`].
pub const UNREACHABLE: u16 = 1 << 10;

/// Shared, immutable snapshot of a field.
type Field = Rc<[u16]>;

/// Number of moves needed to reach one pawn's goal from every cell of the board.
///
/// The field only reflects the board's topology: pawns, including the one being measured,
/// are ignored while it is computed.
///
/// Fields are memoized by [`StateKey::topology`], and a snapshot stack lets the search save and restore
/// the current field around simulated actions.
#[derive(Debug)]
pub struct DistanceField {
    /// Index of the pawn this field measures.
    pawn: usize,

    cols: usize,

    /// The field for the state last passed to [`DistanceField::update`].
    field: Field,

    /// Fields keyed by [`StateKey::topology`].
    memo: HashMap<StateKey, Field>,

    stack: Vec<Field>,

    /// Number of updates answered by the memo.
    pub(crate) hits: usize,

    /// Number of updates that had to compute a new field.
    pub(crate) misses: usize,
}

impl DistanceField {
    /// Creates the field of pawn `pawn` for the current state of `board`.
    pub fn new(board: &Board, pawn: usize) -> Self {
        let mut field = Self {
            pawn,
            cols: board.cols(),
            field: Rc::from(Vec::new()),
            memo: HashMap::new(),
            stack: Vec::new(),
            hits: 0,
            misses: 0,
        };

        field.update(board);
        field
    }

    /// Brings this field up to date with `board`, recomputing it only if these walls have not been seen.
    pub fn update(&mut self, board: &Board) {
        let key = board.state_key().topology();

        if let Some(field) = self.memo.get(&key) {
            self.hits += 1;
            self.field = Rc::clone(field);
            return;
        }

        self.misses += 1;
        self.field = compute(board, self.pawn);
        self.memo.insert(key, Rc::clone(&self.field));
    }

    /// Distance from `coord` to the goal, or [`UNREACHABLE`].
    #[inline(always)]
    pub fn get(&self, coord: Coord) -> u16 {
        self.field[coord.index(self.cols)]
    }

    /// Number of moves the pawn needs to reach its goal from where it stands on `board`.
    ///
    /// This is `0` on the goal, [`UNREACHABLE`] when the pawn cannot move,
    /// and otherwise one more than the best distance among the pawn's valid moves,
    /// so jumps over other pawns are accounted for.
    pub fn shortest_path_len(&self, board: &Board) -> u16 {
        let pawn = board.pawn(self.pawn);
        if pawn.has_arrived() {
            return 0;
        }

        board
            .valid_moves(self.pawn)
            .into_iter()
            .map(|to| self.get(to))
            .min()
            .map_or(UNREACHABLE, |best| (best + 1).min(UNREACHABLE))
    }

    /// Saves the current field so it can be restored with [`DistanceField::pop`].
    #[inline(always)]
    pub fn push(&mut self) {
        self.stack.push(Rc::clone(&self.field));
    }

    /// Restores the field saved by the matching [`DistanceField::push`].
    ///
    /// # Panics
    /// If there is no saved field.
    #[inline(always)]
    pub fn pop(&mut self) {
        self.field = self
            .stack
            .pop()
            .unwrap_or_else(|| panic!("Distance field {} popped without a push", self.pawn));
    }

    /// Evicts every memoized field for a state that can no longer occur after `current`.
    pub fn prune(&mut self, current: &StateKey) {
        self.memo.retain(|key, _| key.is_reachable_from(current));
    }

    /// Number of memoized fields.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.memo.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.memo.is_empty()
    }
}

impl Index<Coord> for DistanceField {
    type Output = u16;

    #[inline(always)]
    fn index(&self, index: Coord) -> &Self::Output {
        &self.field[index.index(self.cols)]
    }
}

impl fmt::Display for DistanceField {
    /// Prints the field as a grid, with `-` for unreachable cells.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "   ")?;
        for col in 0..self.cols as u8 {
            write!(f, "{:>4}", (b'a' + col) as char)?;
        }

        for (i, dist) in self.field.iter().enumerate() {
            if i % self.cols == 0 {
                write!(f, "\n{:>3}", i / self.cols + 1)?;
            }

            if *dist >= UNREACHABLE {
                write!(f, "{:>4}", '-')?;
            } else {
                write!(f, "{dist:>4}")?;
            }
        }

        Ok(())
    }
}

/// Multi-source breadth-first search outwards from every goal cell of `pawn`.
fn compute(board: &Board, pawn: usize) -> Field {
    let cols = board.cols();
    let mut field = vec![UNREACHABLE; board.area()];
    let mut scheduled = vec![false; board.area()];
    let mut queue = VecDeque::with_capacity(board.area());

    for goal in board.pawn(pawn).goal().cells(board.rows(), cols) {
        let i = goal.index(cols);
        field[i] = 0;
        scheduled[i] = true;
        queue.push_back(goal);
    }

    while let Some(coord) = queue.pop_front() {
        let i = coord.index(cols);
        scheduled[i] = false;
        let next = field[i] + 1;

        // Passages are symmetric, so every open neighbour can step back into `coord`
        for dir in Direction::ALL {
            if !board.is_open(coord, dir) {
                continue;
            }

            let n = (coord + dir).index(cols);
            if next < field[n] {
                field[n] = next;
                if !scheduled[n] {
                    scheduled[n] = true;
                    queue.push_back(coord + dir);
                }
            }
        }
    }

    field.into()
}

/// One [`DistanceField`] per pawn, in turn order.
#[derive(Debug)]
pub struct Distances(Vec<DistanceField>);

impl Distances {
    /// Creates the fields of every pawn on `board`.
    pub fn new(board: &Board) -> Self {
        Self(
            (0..board.num_players())
                .map(|pawn| DistanceField::new(board, pawn))
                .collect(),
        )
    }

    /// Brings every field up to date with `board`.
    #[inline(always)]
    pub fn update_all(&mut self, board: &Board) {
        self.0.iter_mut().for_each(|field| field.update(board));
    }

    #[inline(always)]
    pub fn push_all(&mut self) {
        self.0.iter_mut().for_each(DistanceField::push);
    }

    #[inline(always)]
    pub fn pop_all(&mut self) {
        self.0.iter_mut().for_each(DistanceField::pop);
    }

    /// Prunes every field's memo against the `current` state.
    pub fn prune_all(&mut self, current: &StateKey) {
        self.0.iter_mut().for_each(|field| field.prune(current));
    }

    /// Shortest path of pawn `pawn`. See [`DistanceField::shortest_path_len`].
    #[inline(always)]
    pub fn shortest_path_len(&self, board: &Board, pawn: usize) -> u16 {
        self.0[pawn].shortest_path_len(board)
    }

    /// Shortest path among every pawn except `pawn`.
    pub fn best_opponent(&self, board: &Board, pawn: usize) -> u16 {
        self.0
            .iter()
            .enumerate()
            .filter(|&(i, _)| i != pawn)
            .map(|(_, field)| field.shortest_path_len(board))
            .min()
            .unwrap_or(UNREACHABLE)
    }

    /// Total memo hits across every field.
    pub fn hits(&self) -> usize {
        self.0.iter().map(|field| field.hits).sum()
    }

    /// Total memo misses across every field.
    pub fn misses(&self) -> usize {
        self.0.iter().map(|field| field.misses).sum()
    }

    /// Total memoized fields across every pawn.
    pub fn memo_len(&self) -> usize {
        self.0.iter().map(DistanceField::len).sum()
    }
}

impl Deref for Distances {
    type Target = [DistanceField];

    #[inline(always)]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Action, Wall};

    #[test]
    fn test_empty_board_distances() {
        let board = Board::default();
        let distances = Distances::new(&board);

        assert_eq!(distances.shortest_path_len(&board, 0), 8);
        assert_eq!(distances.shortest_path_len(&board, 1), 8);
        assert_eq!(distances[0][Coord::new(0, 0)], 0);
        assert_eq!(distances[0][Coord::new(8, 0)], 8);
        assert_eq!(distances[1][Coord::new(8, 8)], 0);
    }

    #[test]
    fn test_walls_lengthen_paths() {
        let mut board = Board::default();
        // A horizontal wall right in front of the bottom pawn forces a sidestep
        board.put_wall(Wall::horizontal(7, 4));

        let distances = Distances::new(&board);
        assert_eq!(distances.shortest_path_len(&board, 0), 9);
        assert_eq!(distances.shortest_path_len(&board, 1), 8);
    }

    #[test]
    fn test_field_ignores_pawns() {
        let mut board = Board::default();
        board.place_pawn(1, Coord::new(7, 4));

        let field = DistanceField::new(&board, 0);
        assert_eq!(field[Coord::new(7, 4)], 7);

        // Jumping over the other pawn is accounted for through valid moves
        assert_eq!(field.shortest_path_len(&board), 7);
    }

    #[test]
    fn test_arrived_pawn_has_no_distance() {
        let mut board = Board::default();
        board.place_pawn(0, Coord::new(0, 2));

        let field = DistanceField::new(&board, 0);
        assert_eq!(field.shortest_path_len(&board), 0);
    }

    #[test]
    fn test_memo_hits() {
        let mut board = Board::default();
        let mut field = DistanceField::new(&board, 0);
        assert_eq!((field.hits, field.misses), (0, 1));

        field.update(&board);
        assert_eq!((field.hits, field.misses), (1, 1));

        let action = Action::PlaceWall(Wall::horizontal(3, 3));
        board.do_action(action);
        field.update(&board);
        assert_eq!((field.hits, field.misses), (1, 2));

        board.undo_action(action);
        field.update(&board);
        assert_eq!((field.hits, field.misses), (2, 2));
        assert_eq!(field.len(), 2);
    }

    #[test]
    fn test_memo_ignores_pawns_and_turn() {
        let mut board = Board::default();
        let mut field = DistanceField::new(&board, 0);

        let step = Action::MovePawn {
            from: Coord::new(8, 4),
            to: Coord::new(7, 4),
        };
        board.do_action(step);
        field.update(&board);
        board.undo_action(step);
        field.update(&board);

        board.next_player();
        field.update(&board);

        assert_eq!((field.hits, field.misses), (3, 1));
        assert_eq!(field.len(), 1);
    }

    #[test]
    fn test_push_pop() {
        let mut board = Board::default();
        let mut field = DistanceField::new(&board, 0);
        let before = field.get(Coord::new(8, 4));

        field.push();
        board.put_wall(Wall::horizontal(7, 3));
        board.put_wall(Wall::horizontal(7, 5));
        field.update(&board);
        assert_ne!(field.get(Coord::new(8, 4)), before);

        field.pop();
        assert_eq!(field.get(Coord::new(8, 4)), before);
    }

    #[test]
    fn test_prune_drops_unreachable_states() {
        let mut board = Board::default();
        let mut field = DistanceField::new(&board, 0);

        board.put_wall(Wall::vertical(2, 2));
        field.update(&board);
        assert_eq!(field.len(), 2);

        // The empty board can never come back once a wall is down
        field.prune(board.state_key());
        assert_eq!(field.len(), 1);
    }
}
