/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{cell::OnceCell, collections::BTreeSet, fmt};

use anyhow::{bail, Result};

use super::{Action, Cell, Coord, Direction, Goal, Pawn, StateKey, Wall};

/// Default number of rows and columns.
pub const DEFAULT_SIZE: usize = 9;

/// Default number of walls each player receives in a two-player game.
pub const DEFAULT_WALLS: u8 = 10;

/// Largest supported side length of the board.
pub const MAX_SIZE: usize = 26;

/// Parameters of a new match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardConfig {
    pub rows: usize,
    pub cols: usize,

    /// Walls per player in a two-player game.
    ///
    /// With four players, each receives half of this amount.
    pub walls: u8,

    /// Either 2 or 4.
    pub players: usize,
}

impl BoardConfig {
    /// Ensures the configuration describes a playable board.
    pub fn validate(&self) -> Result<()> {
        if !(3..=MAX_SIZE).contains(&self.rows) || !(3..=MAX_SIZE).contains(&self.cols) {
            bail!(
                "Board must be between 3x3 and {MAX_SIZE}x{MAX_SIZE}, got {}x{}",
                self.rows,
                self.cols
            );
        }

        if self.players != 2 && self.players != 4 {
            bail!("Only 2 or 4 players are supported, got {}", self.players);
        }

        Ok(())
    }

    /// Starting cell of every pawn, in turn order.
    ///
    /// The first two pawns start on the bottom and top edges; with four players
    /// the other two start on the left and right edges.
    pub fn starts(&self) -> Vec<Coord> {
        let (rows, cols) = (self.rows as i8, self.cols as i8);
        let mut starts = vec![Coord::new(rows - 1, cols / 2), Coord::new(0, cols / 2)];

        if self.players == 4 {
            starts.extend([Coord::new(rows / 2, 0), Coord::new(rows / 2, cols - 1)]);
        }

        starts
    }

    /// Walls each pawn starts with.
    #[inline(always)]
    pub const fn walls_per_pawn(&self) -> u8 {
        if self.players == 4 {
            self.walls / 2
        } else {
            self.walls
        }
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            rows: DEFAULT_SIZE,
            cols: DEFAULT_SIZE,
            walls: DEFAULT_WALLS,
            players: 2,
        }
    }
}

/// The state of a match: cells, walls, pawns and whose turn it is.
///
/// The board is created once per match and then mutated in place.
/// Every mutation goes through a method that keeps cell paths symmetric,
/// keeps pawn coordinates and cell occupancy in sync, and invalidates the cached [`StateKey`].
#[derive(Clone)]
pub struct Board {
    rows: usize,
    cols: usize,

    /// Row-major grid of cells.
    cells: Vec<Cell>,

    /// Walls placed so far.
    walls: BTreeSet<Wall>,

    /// Pawns in turn order.
    pawns: Vec<Pawn>,

    /// Index of the pawn whose turn it is.
    player: usize,

    /// Lazily computed serialization of this board.
    key: OnceCell<StateKey>,
}

impl Board {
    /// Creates a board for a new match.
    ///
    /// # Panics
    /// If `config` does not pass [`BoardConfig::validate`].
    pub fn new(config: BoardConfig) -> Self {
        assert!(
            config.validate().is_ok(),
            "Invalid board configuration {config:?}"
        );

        let BoardConfig { rows, cols, .. } = config;

        let mut board = Self {
            rows,
            cols,
            cells: vec![Cell::OPEN; rows * cols],
            walls: BTreeSet::new(),
            pawns: Vec::with_capacity(config.players),
            player: 0,
            key: OnceCell::new(),
        };

        // Nothing can leave the board
        for row in 0..rows as i8 {
            for col in 0..cols as i8 {
                let coord = Coord::new(row, col);
                for dir in Direction::ALL {
                    if !board.in_range(coord + dir) {
                        board.cell_mut(coord).set_open(dir, false);
                    }
                }
            }
        }

        for (i, start) in config.starts().into_iter().enumerate() {
            let goal = Goal::opposite_of(start, rows, cols);
            board
                .pawns
                .push(Pawn::new(start, config.walls_per_pawn(), goal));
            board.cell_mut(start).pawn = Some(i);
        }

        board
    }

    #[inline(always)]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    #[inline(always)]
    pub const fn cols(&self) -> usize {
        self.cols
    }

    /// Number of cells on the board.
    #[inline(always)]
    pub const fn area(&self) -> usize {
        self.rows * self.cols
    }

    /// Returns `true` if `coord` lies on the board.
    #[inline(always)]
    pub const fn in_range(&self, coord: Coord) -> bool {
        coord.within(self.rows, self.cols)
    }

    /// Fetches the cell at `coord`.
    ///
    /// # Panics
    /// If `coord` is not on the board.
    #[inline(always)]
    pub fn cell(&self, coord: Coord) -> &Cell {
        assert!(self.in_range(coord), "Cell {coord:?} is outside of the board");
        &self.cells[coord.index(self.cols)]
    }

    #[inline(always)]
    fn cell_mut(&mut self, coord: Coord) -> &mut Cell {
        assert!(self.in_range(coord), "Cell {coord:?} is outside of the board");
        &mut self.cells[coord.index(self.cols)]
    }

    /// Returns `true` if a pawn may step from `coord` towards `direction`.
    #[inline(always)]
    pub fn is_open(&self, coord: Coord, direction: Direction) -> bool {
        self.cell(coord).is_open(direction)
    }

    #[inline(always)]
    pub fn pawns(&self) -> &[Pawn] {
        &self.pawns
    }

    #[inline(always)]
    pub fn pawn(&self, index: usize) -> &Pawn {
        &self.pawns[index]
    }

    #[inline(always)]
    pub fn num_players(&self) -> usize {
        self.pawns.len()
    }

    /// Index of the player whose turn it is.
    #[inline(always)]
    pub const fn current_player(&self) -> usize {
        self.player
    }

    /// The pawn whose turn it is.
    #[inline(always)]
    pub fn current_pawn(&self) -> &Pawn {
        &self.pawns[self.player]
    }

    /// Walls placed so far, in sorted order.
    #[inline(always)]
    pub fn walls(&self) -> impl Iterator<Item = &Wall> {
        self.walls.iter()
    }

    #[inline(always)]
    pub fn has_wall(&self, wall: &Wall) -> bool {
        self.walls.contains(wall)
    }

    /// Opens or closes the edge between `coord` and its neighbour in `direction`, on both sides.
    fn set_path(&mut self, coord: Coord, direction: Direction, open: bool) {
        self.cell_mut(coord).set_open(direction, open);

        let neighbour = coord + direction;
        if self.in_range(neighbour) {
            self.cell_mut(neighbour).set_open(direction.opposite(), open);
        }
    }

    /// Places `wall` on the board, closing the two paths it blocks.
    ///
    /// Does nothing if the wall is already on the board.
    /// No legality checks are made; see [`Board::can_put_wall`].
    pub fn put_wall(&mut self, wall: Wall) {
        if !self.walls.insert(wall) {
            return;
        }

        let (cells, dir) = wall.cells();
        for coord in cells {
            self.set_path(coord, dir, false);
        }

        self.invalidate();
    }

    /// Removes `wall` from the board, re-opening the two paths it blocked.
    ///
    /// Does nothing if the wall is not on the board.
    pub fn remove_wall(&mut self, wall: Wall) {
        if !self.walls.remove(&wall) {
            return;
        }

        let (cells, dir) = wall.cells();
        for coord in cells {
            self.set_path(coord, dir, true);
        }

        self.invalidate();
    }

    /// Moves pawn `index` onto `to`, vacating its old cell.
    fn move_pawn(&mut self, index: usize, to: Coord) {
        let from = self.pawns[index].coord;
        if from == to {
            return;
        }

        assert!(
            self.cell(to).is_empty(),
            "Cannot move pawn {index} onto occupied cell {to:?}"
        );

        self.cell_mut(from).pawn = None;
        self.cell_mut(to).pawn = Some(index);
        self.pawns[index].coord = to;

        self.invalidate();
    }

    /// Places pawn `index` on `coord`, regardless of whether it could legally get there.
    ///
    /// Useful for setting up positions.
    pub fn place_pawn(&mut self, index: usize, coord: Coord) {
        self.move_pawn(index, coord);
    }

    /// Sets the number of walls pawn `index` has left.
    pub fn set_walls(&mut self, index: usize, walls: u8) {
        self.pawns[index].walls = walls;
        self.invalidate();
    }

    /// Applies `action` on behalf of the current player.
    ///
    /// No legality checks are made beyond the pawn actually standing on `from`;
    /// callers validate with [`Board::is_legal`] first.
    ///
    /// # Panics
    /// If a pawn move does not start on the current pawn's cell,
    /// or if the current player has no walls left to place.
    pub fn do_action(&mut self, action: Action) {
        let player = self.player;

        match action {
            Action::MovePawn { from, to } => {
                assert_eq!(
                    self.pawns[player].coord, from,
                    "Pawn {player} is not on {from:?}"
                );
                self.move_pawn(player, to);
            }

            Action::PlaceWall(wall) => {
                assert!(self.pawns[player].walls > 0, "Pawn {player} has no walls left");
                self.put_wall(wall);
                self.pawns[player].walls -= 1;
                self.invalidate();
            }
        }
    }

    /// Reverts `action`, which must have been the last action applied by the current player.
    pub fn undo_action(&mut self, action: Action) {
        let player = self.player;

        match action {
            Action::MovePawn { from, to } => {
                assert_eq!(self.pawns[player].coord, to, "Pawn {player} is not on {to:?}");
                self.move_pawn(player, from);
            }

            Action::PlaceWall(wall) => {
                self.remove_wall(wall);
                self.pawns[player].walls += 1;
                self.invalidate();
            }
        }
    }

    /// Passes the turn to the next player.
    #[inline(always)]
    pub fn next_player(&mut self) {
        self.player = (self.player + 1) % self.pawns.len();
        self.invalidate();
    }

    /// Passes the turn back to the previous player.
    #[inline(always)]
    pub fn previous_player(&mut self) {
        let n = self.pawns.len();
        self.player = (self.player + n - 1) % n;
        self.invalidate();
    }

    /// Index of the first pawn standing on its goal, if any.
    #[inline(always)]
    pub fn winner(&self) -> Option<usize> {
        self.pawns.iter().position(Pawn::has_arrived)
    }

    /// Returns `true` once any pawn has reached its goal.
    #[inline(always)]
    pub fn finished(&self) -> bool {
        self.winner().is_some()
    }

    /// The serialization of this board, computed on first use after every change.
    pub fn state_key(&self) -> &StateKey {
        self.key.get_or_init(|| {
            let passages = (0..self.cols as i8 - 1).flat_map(|col| {
                (0..self.rows as i8 - 1).flat_map(move |row| {
                    let cell = self.cell(Coord::new(row, col));
                    [cell.is_open(Direction::South), cell.is_open(Direction::East)]
                })
            });

            StateKey::new(self.player, &self.pawns, passages)
        })
    }

    /// Takes the cached key, leaving the cache empty.
    #[inline(always)]
    pub(crate) fn take_key(&mut self) -> Option<StateKey> {
        self.key.take()
    }

    /// Restores a key taken with [`Board::take_key`], once the board is back in that state.
    #[inline(always)]
    pub(crate) fn restore_key(&mut self, key: Option<StateKey>) {
        self.key = key.map(OnceCell::from).unwrap_or_default();
    }

    #[inline(always)]
    fn invalidate(&mut self) {
        self.key.take();
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new(BoardConfig::default())
    }
}

impl fmt::Display for Board {
    /// Draws the board, with pawns shown by their index and walls shown as `|` and `=`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "    ")?;
        for col in 0..self.cols as u8 {
            write!(f, "{}   ", (b'a' + col) as char)?;
        }
        writeln!(f)?;

        for row in 0..self.rows as i8 {
            write!(f, "{:>2}  ", row + 1)?;
            for col in 0..self.cols as i8 {
                let cell = self.cell(Coord::new(row, col));
                match cell.pawn() {
                    Some(pawn) => write!(f, "{pawn}")?,
                    None => write!(f, ".")?,
                }

                if col + 1 < self.cols as i8 {
                    let sep = if cell.is_open(Direction::East) { "   " } else { " | " };
                    write!(f, "{sep}")?;
                }
            }
            writeln!(f)?;

            if row + 1 < self.rows as i8 {
                write!(f, "    ")?;
                for col in 0..self.cols as i8 {
                    let open = self.is_open(Coord::new(row, col), Direction::South);
                    write!(f, "{}   ", if open { ' ' } else { '=' })?;
                }
                writeln!(f)?;
            }
        }

        for (i, pawn) in self.pawns.iter().enumerate() {
            let marker = if i == self.player { '*' } else { ' ' };
            writeln!(
                f,
                "{marker} Player {i}: {} walls: {}",
                pawn.coord(),
                pawn.walls()
            )?;
        }

        write!(f, "Key: {}", self.state_key())
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}
