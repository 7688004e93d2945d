/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::collections::HashMap;

use crate::{Action, Score, SearchBounds, StateKey};

/// Type of node encountered during search.
///
/// See [CPW](https://www.chessprogramming.org/Node_Types) for more.
#[derive(PartialEq, Eq, Clone, Copy, Debug, Hash)]
pub enum NodeType {
    /// The score is exact.
    Pv,

    /// The score is less than alpha (upper bound).
    All,

    /// The score is greater than or equal to beta (lower bound).
    Cut,
}

impl NodeType {
    /// Creates a new [`NodeType`] based on the parameters as follows:
    ///
    /// ```text
    /// if score <= alpha:
    ///     UPPERBOUND
    /// else if score >= beta:
    ///     LOWERBOUND
    /// else:
    ///     EXACT
    /// ```
    #[inline(always)]
    pub fn new(score: Score, bounds: SearchBounds) -> Self {
        if score <= bounds.alpha {
            Self::All
        } else if score >= bounds.beta {
            Self::Cut
        } else {
            Self::Pv
        }
    }
}

/// The result of searching one node, as remembered by the [`TTable`].
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct TTableEntry {
    /// Best action found for this node, if any action raised alpha.
    pub bestmove: Option<Action>,

    /// Score the node returned.
    pub score: Score,

    /// Node type of this entry.
    pub node_type: NodeType,
}

impl TTableEntry {
    /// Creates a new [`TTableEntry`] for a node searched within `bounds`.
    ///
    /// The search is fail-hard, so an exact score lies strictly within `bounds`,
    /// and a bound is stored as the bound itself.
    #[inline(always)]
    pub fn new(bestmove: Option<Action>, score: Score, bounds: SearchBounds) -> Self {
        Self {
            bestmove,
            score,
            node_type: NodeType::new(score, bounds),
        }
    }

    /// Determine whether the score in this entry can be used within `bounds` and, if so, return it.
    ///
    /// An entry's score can be used if and only if:
    ///     1. The entry is exact ([`NodeType::Pv`]), in which case it is clamped to `bounds`.
    ///     2. The entry is an upper bound ([`NodeType::All`]) and its score is `<= alpha`.
    ///     3. The entry is a lower bound ([`NodeType::Cut`]) and its score is `>= beta`.
    ///
    /// The returned score is exactly what searching the node again within `bounds` would return.
    #[inline(always)]
    pub fn try_score(&self, bounds: SearchBounds) -> Option<Score> {
        match self.node_type {
            NodeType::Pv => Some(self.score.clamp(bounds.alpha, bounds.beta)),
            NodeType::All => (self.score <= bounds.alpha).then_some(bounds.alpha),
            NodeType::Cut => (self.score >= bounds.beta).then_some(bounds.beta),
        }
    }
}

/// Memo table of search results.
///
/// Used during a search to keep track of previous search results on positions,
/// avoiding unnecessary re-computations.
///
/// Entries are keyed by ply as well as by state: the same state reached at a different ply
/// has a different amount of search left below it.
#[derive(Debug, Default)]
pub struct TTable {
    cache: HashMap<(usize, StateKey), TTableEntry>,

    /// Number of lookups that produced a usable score since last clearing.
    pub(crate) hits: usize,

    /// Number of lookups that did not since last clearing.
    pub(crate) misses: usize,
}

impl TTable {
    #[inline(always)]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears the entries of this [`TTable`].
    #[inline(always)]
    pub fn clear(&mut self) {
        self.cache.clear();
        self.hits = 0;
        self.misses = 0;
    }

    /// Returns the number of entries in this [`TTable`].
    #[inline(always)]
    pub fn num_entries(&self) -> usize {
        self.cache.len()
    }

    /// Get the entry for `key` searched at `ply`, if one exists.
    #[inline(always)]
    pub fn get(&self, ply: usize, key: &StateKey) -> Option<&TTableEntry> {
        self.cache.get(&(ply, key.clone()))
    }

    /// Looks up a usable score for `key` at `ply` within `bounds`, counting the hit or miss.
    pub fn probe(
        &mut self,
        ply: usize,
        key: &StateKey,
        bounds: SearchBounds,
    ) -> Option<(Option<Action>, Score)> {
        let found = self
            .get(ply, key)
            .and_then(|entry| Some((entry.bestmove, entry.try_score(bounds)?)));

        if found.is_some() {
            self.hits += 1;
        } else {
            self.misses += 1;
        }

        found
    }

    /// Store `entry` for `key` at `ply`, overriding and returning whatever was there.
    #[inline(always)]
    pub fn store(&mut self, ply: usize, key: StateKey, entry: TTableEntry) -> Option<TTableEntry> {
        self.cache.insert((ply, key), entry)
    }

    /// Evicts every entry for a state that can no longer occur after `current`.
    pub fn prune(&mut self, current: &StateKey) {
        self.cache.retain(|(_, key), _| key.is_reachable_from(current));
    }
}
