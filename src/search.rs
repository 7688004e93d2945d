/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{collections::HashMap, fmt, ops::Neg};

use log::{debug, info, trace};

use crate::{Action, Board, Distances, Evaluator, Score, StateKey, TTable, TTableEntry, Wall};

/// Maximum level (depth) that can be searched.
pub const MAX_LEVEL: usize = 32;

/// The result of a search, containing the best action found, score, and total nodes searched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SearchResult {
    /// Number of nodes searched.
    pub nodes: u64,

    /// Best action found during the search.
    pub bestmove: Option<Action>,

    /// Evaluation of the position after `bestmove` is made, from the searching player's perspective.
    pub score: Score,
}

impl Default for SearchResult {
    /// A default search result should initialize to a *very bad* value,
    /// since there isn't an action to play.
    #[inline(always)]
    fn default() -> Self {
        Self {
            nodes: 0,
            bestmove: None,
            score: -Score::INF,
        }
    }
}

/// Bounds of the alpha-beta window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchBounds {
    /// Lower bound.
    ///
    /// We are guaranteed a score that is AT LEAST `alpha`.
    /// During search, if no action can raise `alpha`, we are said to have "failed low."
    ///
    /// On a fail-low, we do not have a "best move."
    pub alpha: Score,

    /// Upper bound.
    ///
    /// Our opponent is guaranteed a score that is AT MOST `beta`.
    /// During search, if an action scores `beta` or higher, we are said to have "failed high."
    ///
    /// On a fail-high, the branch is pruned, since our opponent has a better action to play earlier in the tree,
    /// which would make this position unreachable for us.
    pub beta: Score,
}

impl SearchBounds {
    /// Create a new [`SearchBounds`] from the provided `alpha` and `beta` values.
    #[inline(always)]
    pub const fn new(alpha: Score, beta: Score) -> Self {
        Self { alpha, beta }
    }
}

impl Neg for SearchBounds {
    type Output = Self;
    /// Negating a [`SearchBounds`] swaps the `alpha` and `beta` fields and negates them both.
    #[inline(always)]
    fn neg(self) -> Self::Output {
        Self {
            alpha: -self.beta,
            beta: -self.alpha,
        }
    }
}

impl Default for SearchBounds {
    /// Default [`SearchBounds`] are a `(-infinity, infinity)`.
    #[inline(always)]
    fn default() -> Self {
        Self::new(-Score::INF, Score::INF)
    }
}

/// Configuration variables for the [`Ai`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchConfig {
    /// Number of plies to look ahead beyond the current one.
    ///
    /// Level `0` scores each available action on its own.
    pub level: usize,

    /// Whether to prune with alpha-beta cutoffs.
    ///
    /// Pruning never changes the chosen action or its score; turning it off gives a plain minimax search.
    pub pruning: bool,

    /// Whether to remember search results between nodes and between searches.
    pub memoize: bool,
}

impl Default for SearchConfig {
    #[inline(always)]
    fn default() -> Self {
        Self {
            level: 0,
            pruning: true,
            memoize: true,
        }
    }
}

/// Counters of the work done, and saved, by an [`Ai`] over a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SearchStats {
    /// Nodes searched.
    pub nodes: u64,

    pub memo_entries: usize,
    pub memo_hits: usize,
    pub memo_misses: usize,

    pub wall_entries: usize,
    pub wall_hits: usize,
    pub wall_misses: usize,

    pub distance_entries: usize,
    pub distance_hits: usize,
    pub distance_misses: usize,
}

impl fmt::Display for SearchStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "nodes     : {}", self.nodes)?;
        writeln!(
            f,
            "memo      : {} entries, {} hits, {} misses",
            self.memo_entries, self.memo_hits, self.memo_misses
        )?;
        writeln!(
            f,
            "walls     : {} entries, {} hits, {} misses",
            self.wall_entries, self.wall_hits, self.wall_misses
        )?;
        write!(
            f,
            "distances : {} entries, {} hits, {} misses",
            self.distance_entries, self.distance_hits, self.distance_misses
        )
    }
}

/// Callback notified of the fraction of root actions searched so far.
pub type ProgressFn = Box<dyn FnMut(f32)>;

/// A computer player's search session.
///
/// Owns every cache the search relies on (distance fields, search memo and wall legality cache),
/// so it is created once per match, alongside the [`Board`] it plays on.
pub struct Ai {
    config: SearchConfig,

    /// Distance field of every pawn.
    distances: Distances,

    /// Search results, keyed by ply and state.
    ttable: TTable,

    /// Legal walls, keyed by [`StateKey::placement`].
    walls: HashMap<StateKey, Vec<Wall>>,

    wall_hits: usize,
    wall_misses: usize,

    /// Total nodes searched.
    nodes: u64,

    progress: Option<ProgressFn>,
}

impl Ai {
    /// Creates a search session for the match being played on `board`.
    ///
    /// # Panics
    /// If `config.level` exceeds [`MAX_LEVEL`].
    pub fn new(board: &Board, config: SearchConfig) -> Self {
        assert!(
            config.level <= MAX_LEVEL,
            "Search level {} exceeds the maximum of {MAX_LEVEL}",
            config.level
        );

        Self {
            config,
            distances: Distances::new(board),
            ttable: TTable::new(),
            walls: HashMap::new(),
            wall_hits: 0,
            wall_misses: 0,
            nodes: 0,
            progress: None,
        }
    }

    #[inline(always)]
    pub fn config(&self) -> SearchConfig {
        self.config
    }

    /// Changes how many plies the search looks ahead.
    ///
    /// Memoized search results were found for a different depth, so they are discarded.
    pub fn set_level(&mut self, level: usize) {
        assert!(level <= MAX_LEVEL, "Search level {level} exceeds the maximum of {MAX_LEVEL}");

        if level != self.config.level {
            self.config.level = level;
            self.ttable.clear();
        }
    }

    /// Registers a callback to be told how far along the root of every search is, in `[0, 1]`.
    pub fn on_progress(&mut self, progress: impl FnMut(f32) + 'static) {
        self.progress = Some(Box::new(progress));
    }

    /// The distance fields, as of the last search or [`Ai::refresh`].
    #[inline(always)]
    pub fn distances(&self) -> &Distances {
        &self.distances
    }

    /// Brings the distance fields up to date with `board`.
    #[inline(always)]
    pub fn refresh(&mut self, board: &Board) {
        self.distances.update_all(board);
    }

    /// An [`Evaluator`] of `board`, which must be the state last passed to [`Ai::refresh`].
    #[inline(always)]
    pub fn evaluator<'a>(&'a self, board: &'a Board) -> Evaluator<'a> {
        Evaluator::new(board, &self.distances)
    }

    /// Snapshot of this session's counters.
    pub fn stats(&self) -> SearchStats {
        SearchStats {
            nodes: self.nodes,
            memo_entries: self.ttable.num_entries(),
            memo_hits: self.ttable.hits,
            memo_misses: self.ttable.misses,
            wall_entries: self.walls.len(),
            wall_hits: self.wall_hits,
            wall_misses: self.wall_misses,
            distance_entries: self.distances.memo_len(),
            distance_hits: self.distances.hits(),
            distance_misses: self.distances.misses(),
        }
    }

    /// Picks an action for the current player, along with its score from that player's perspective.
    ///
    /// Returns `None` if the match is over or the current player has nothing to do.
    /// `board` is left exactly as it was found.
    #[inline(always)]
    pub fn best_action(&mut self, board: &mut Board) -> Option<(Action, Score)> {
        let res = self.search(board);
        res.bestmove.map(|action| (action, res.score))
    }

    /// Searches for the best action for the current player.
    pub fn search(&mut self, board: &mut Board) -> SearchResult {
        let mut res = SearchResult::default();
        if board.finished() {
            return res;
        }

        let player = board.current_player();
        let pawn = *board.current_pawn();

        // Nothing beats stepping onto the goal
        if let Some(to) = board
            .valid_moves(player)
            .into_iter()
            .find(|&to| pawn.goal().contains(to))
        {
            res.bestmove = Some(Action::MovePawn {
                from: pawn.coord(),
                to,
            });
            res.score = Score::WIN;
            info!("Player {player} can reach its goal at {to}");
            return res;
        }

        let start = self.nodes;
        self.distances.update_all(board);

        let (bestmove, score) = self.negamax(board, 0, SearchBounds::default());
        res = SearchResult {
            nodes: self.nodes - start,
            bestmove,
            score,
        };

        let key = board.state_key().clone();
        self.prune(&key);

        match bestmove {
            Some(action) => info!(
                "Player {player} chose {action} with score {score:?} after {} nodes at level {}",
                res.nodes, self.config.level
            ),
            None => info!("Player {player} has no action to play"),
        }
        debug!("Search statistics:\n{}", self.stats());

        res
    }

    /// Evicts every cached entry for a state that can no longer occur after `current`.
    pub fn prune(&mut self, current: &StateKey) {
        self.ttable.prune(current);
        self.walls.retain(|key, _| key.is_reachable_from(current));
        self.distances.prune_all(current);
    }

    /// Every action available to the current player: pawn moves first, then any legal walls.
    fn actions(&mut self, board: &mut Board) -> Vec<Action> {
        let mut actions: Vec<Action> = board.pawn_actions().collect();

        if board.current_pawn().walls() == 0 {
            return actions;
        }

        let key = board.state_key().placement();
        if let Some(walls) = self.walls.get(&key) {
            self.wall_hits += 1;
            actions.extend(walls.iter().copied().map(Action::PlaceWall));
            return actions;
        }

        self.wall_misses += 1;
        let walls = board.legal_walls();
        actions.extend(walls.iter().copied().map(Action::PlaceWall));
        self.walls.insert(key, walls);

        actions
    }

    /// Primary location of search logic.
    ///
    /// Uses the [negamax](https://www.chessprogramming.org/Negamax) algorithm with fail-hard alpha-beta pruning:
    /// the returned score is always clamped to `bounds`.
    fn negamax(
        &mut self,
        board: &mut Board,
        ply: usize,
        bounds: SearchBounds,
    ) -> (Option<Action>, Score) {
        self.nodes += 1;

        let key = self.config.memoize.then(|| board.state_key().clone());
        if let Some(key) = &key {
            if let Some(found) = self.ttable.probe(ply, key, bounds) {
                trace!("Memo hit at ply {ply}: {found:?}");
                return found;
            }
        }

        let actions = self.actions(board);

        let (bestmove, score) = if actions.is_empty() {
            // Stuck behind other pawns without walls to place
            self.distances.update_all(board);
            let score = self.evaluator(board).eval();
            (None, score.clamp(bounds.alpha, bounds.beta))
        } else if ply >= self.config.level {
            self.leaf(board, ply, bounds, &actions)
        } else {
            self.internal(board, ply, bounds, &actions)
        };

        if let Some(key) = key {
            self.ttable
                .store(ply, key, TTableEntry::new(bestmove, score, bounds));
        }

        (bestmove, score)
    }

    /// Scores every action by the race it leaves behind.
    fn leaf(
        &mut self,
        board: &mut Board,
        ply: usize,
        bounds: SearchBounds,
        actions: &[Action],
    ) -> (Option<Action>, Score) {
        let player = board.current_player();
        let SearchBounds { mut alpha, beta } = bounds;
        let mut bestmove = None;

        // At level 0, ties go to actions that hold our ground while setting the opponent back
        let before = (self.config.level == 0).then(|| self.distances_of(board, player));

        for (i, &action) in actions.iter().enumerate() {
            board.do_action(action);

            let (score, after) = if board.pawn(player).has_arrived() {
                (Score::WIN - ply as i32, None)
            } else {
                self.distances.update_all(board);
                let after = self.distances_of(board, player);
                (Score::from(after.1) - Score::from(after.0), Some(after))
            };

            board.undo_action(action);
            self.report_progress(ply, i + 1, actions.len());

            if self.config.pruning && score >= beta {
                bestmove = Some(action);
                alpha = beta;
                break;
            }

            if score > alpha {
                alpha = score;
                bestmove = Some(action);
            } else if score == alpha && bestmove.is_some() && holds_ground(before, after) {
                bestmove = Some(action);
            }
        }

        (bestmove, alpha)
    }

    /// Scores every action by searching the replies to it.
    fn internal(
        &mut self,
        board: &mut Board,
        ply: usize,
        bounds: SearchBounds,
        actions: &[Action],
    ) -> (Option<Action>, Score) {
        let player = board.current_player();
        let SearchBounds { mut alpha, beta } = bounds;
        let mut bestmove = None;

        self.distances.push_all();

        for (i, &action) in actions.iter().enumerate() {
            board.do_action(action);

            let score = if board.pawn(player).has_arrived() {
                Score::WIN - ply as i32
            } else {
                let child = if self.config.pruning {
                    -SearchBounds::new(alpha, beta)
                } else {
                    SearchBounds::default()
                };

                board.next_player();
                let (_, score) = self.negamax(board, ply + 1, child);
                board.previous_player();

                -score
            };

            board.undo_action(action);
            self.report_progress(ply, i + 1, actions.len());

            if self.config.pruning && score >= beta {
                bestmove = Some(action);
                alpha = beta;
                break;
            }

            if score > alpha {
                alpha = score;
                bestmove = Some(action);
            }
        }

        self.distances.pop_all();

        (bestmove, alpha)
    }

    /// Shortest paths of `pawn` and of its closest opponent.
    #[inline(always)]
    fn distances_of(&self, board: &Board, pawn: usize) -> (u16, u16) {
        let eval = self.evaluator(board);
        (eval.own_distance(pawn), eval.opponent_distance(pawn))
    }

    fn report_progress(&mut self, ply: usize, done: usize, total: usize) {
        if ply != 0 {
            return;
        }

        let fraction = done as f32 / total as f32;
        debug!("Thinking: {:3.0}% done", fraction * 100.0);

        if let Some(progress) = self.progress.as_mut() {
            progress(fraction);
        }
    }
}

/// Returns `true` if going from `before` to `after` (own and opponent distances)
/// did not lengthen our path but did lengthen the opponent's.
#[inline(always)]
fn holds_ground(before: Option<(u16, u16)>, after: Option<(u16, u16)>) -> bool {
    match (before, after) {
        (Some((own, opponent)), Some((own_after, opponent_after))) => {
            own_after <= own && opponent_after > opponent
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use super::*;
    use crate::{BoardConfig, Coord};

    fn small_board() -> Board {
        Board::new(BoardConfig {
            rows: 5,
            cols: 5,
            walls: 2,
            players: 2,
        })
    }

    #[test]
    fn test_immediate_win() {
        let mut board = Board::default();
        board.place_pawn(0, Coord::new(1, 2));

        let mut ai = Ai::new(&board, SearchConfig::default());
        let (action, score) = ai.best_action(&mut board).unwrap();

        assert_eq!(
            action,
            Action::MovePawn {
                from: Coord::new(1, 2),
                to: Coord::new(0, 2)
            }
        );
        assert_eq!(score, Score::WIN);
        assert_eq!(ai.stats().nodes, 0);
    }

    #[test]
    fn test_finished_board_has_no_action() {
        let mut board = Board::default();
        board.place_pawn(1, Coord::new(8, 0));

        let mut ai = Ai::new(&board, SearchConfig::default());
        assert!(ai.best_action(&mut board).is_none());
    }

    #[test]
    fn test_level_zero_prefers_blocking() {
        let mut board = Board::default();
        let mut ai = Ai::new(&board, SearchConfig::default());

        let (action, score) = ai.best_action(&mut board).unwrap();
        assert_eq!(score, Score(1));

        // Stepping forward scores the same, but a wall in front of the opponent holds our ground
        let Action::PlaceWall(wall) = action else {
            panic!("Expected a wall, got {action}");
        };

        board.do_action(Action::PlaceWall(wall));
        ai.refresh(&board);
        assert_eq!(ai.evaluator(&board).own_distance(0), 8);
        assert_eq!(ai.evaluator(&board).own_distance(1), 9);
    }

    #[test]
    fn test_search_leaves_board_untouched() {
        let mut board = small_board();
        let before = board.state_key().clone();

        let mut ai = Ai::new(
            &board,
            SearchConfig {
                level: 2,
                ..Default::default()
            },
        );
        ai.best_action(&mut board).unwrap();

        assert_eq!(board.state_key(), &before);
        assert_eq!(board.current_player(), 0);
        assert_eq!(board.walls().count(), 0);
    }

    #[test]
    fn test_progress_reaches_completion() {
        let mut board = small_board();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let mut ai = Ai::new(
            &board,
            SearchConfig {
                level: 1,
                ..Default::default()
            },
        );
        let sink = Rc::clone(&seen);
        ai.on_progress(move |fraction| sink.borrow_mut().push(fraction));
        ai.best_action(&mut board).unwrap();

        let seen = seen.borrow();
        assert!(!seen.is_empty());
        assert!(seen.windows(2).all(|w| w[0] < w[1]));
        assert!(seen.iter().all(|&f| f > 0.0 && f <= 1.0));
    }

    #[test]
    fn test_memo_is_used_across_searches() {
        let mut board = small_board();
        let mut ai = Ai::new(
            &board,
            SearchConfig {
                level: 1,
                ..Default::default()
            },
        );

        let first = ai.best_action(&mut board);
        let hits = ai.stats().memo_hits;
        let second = ai.best_action(&mut board);

        assert_eq!(first, second);
        assert!(ai.stats().memo_hits > hits);
    }

    #[test]
    fn test_set_level_discards_memo() {
        let mut board = small_board();
        let mut ai = Ai::new(&board, SearchConfig::default());
        ai.best_action(&mut board);
        assert!(ai.stats().memo_entries > 0);

        ai.set_level(0);
        assert!(ai.stats().memo_entries > 0);

        ai.set_level(1);
        assert_eq!(ai.stats().memo_entries, 0);
    }

    #[test]
    fn test_bounds_negation() {
        let bounds = SearchBounds::new(Score(-3), Score(7));
        assert_eq!(-bounds, SearchBounds::new(Score(-7), Score(3)));
        assert_eq!(-(-bounds), bounds);
    }
}
