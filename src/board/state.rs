/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use super::Pawn;

/// Number of bytes each pawn occupies in a [`StateKey`].
const PAWN_BYTES: usize = 3;

/// A canonical serialization of a board, used as the identity for every memo table.
///
/// Layout:
/// ```text
///     [player] [row col walls] * pawns [passage bits ...]
///     \______________ head ___________/
/// ```
/// The passage bits hold the South and East passability (1 = open) of every interior cell,
/// column by column, packed eight to a byte.
///
/// Walls are only ever added during a real match, so the open passages of any future
/// state are a subset of the open passages of the current one. [`StateKey::is_reachable_from`]
/// uses this to decide which cached entries are still worth keeping.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateKey {
    /// Length of the player and pawn section.
    head: usize,

    bytes: Box<[u8]>,
}

impl StateKey {
    /// Builds a key from the side to move, every pawn, and the passage bits.
    pub(crate) fn new(player: usize, pawns: &[Pawn], passages: impl IntoIterator<Item = bool>) -> Self {
        let head = 1 + PAWN_BYTES * pawns.len();
        let mut bytes = Vec::with_capacity(head + 16);

        bytes.push(player as u8);
        for pawn in pawns {
            let coord = pawn.coord();
            bytes.extend([coord.row as u8, coord.col as u8, pawn.walls()]);
        }

        let mut bit = 0;
        for open in passages {
            if bit == 0 {
                bytes.push(0);
            }

            if let (true, Some(byte)) = (open, bytes.last_mut()) {
                *byte |= 1 << bit;
            }

            bit = (bit + 1) % 8;
        }

        Self {
            head,
            bytes: bytes.into_boxed_slice(),
        }
    }

    /// Index of the player whose turn it is.
    #[inline(always)]
    pub fn player(&self) -> usize {
        self.bytes[0] as usize
    }

    /// Number of pawns encoded in this key.
    #[inline(always)]
    pub fn num_pawns(&self) -> usize {
        (self.head - 1) / PAWN_BYTES
    }

    /// The packed passage bits.
    #[inline(always)]
    pub fn passages(&self) -> &[u8] {
        &self.bytes[self.head..]
    }

    /// Returns the raw bytes of this key.
    #[inline(always)]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// A copy of this key with the side to move and every wall count zeroed out.
    ///
    /// Whether a wall may be placed depends only on the pawn coordinates and the open passages,
    /// so this is the identity used to cache wall legality.
    pub fn placement(&self) -> Self {
        let mut bytes = self.bytes.clone();
        bytes[0] = 0;
        for pawn in 0..self.num_pawns() {
            bytes[1 + pawn * PAWN_BYTES + 2] = 0;
        }

        Self {
            head: self.head,
            bytes,
        }
    }

    /// A copy of this key with the whole player and pawn section zeroed out, leaving only the passages.
    ///
    /// Distance fields ignore pawns entirely, so this is the identity used to memoize them.
    pub fn topology(&self) -> Self {
        let mut bytes = self.bytes.clone();
        bytes[..self.head].fill(0);

        Self {
            head: self.head,
            bytes,
        }
    }

    /// Returns `true` if the state `self` describes may still occur after the state `current`.
    ///
    /// Only the passage section is compared: every passage open in `self` must also be open in `current`.
    /// The player and pawn section is ignored.
    pub fn is_reachable_from(&self, current: &Self) -> bool {
        let ours = self.passages();
        let theirs = current.passages();

        self.head == current.head
            && ours.len() == theirs.len()
            && ours.iter().zip(theirs).all(|(&o, &t)| o & !t == 0)
    }
}

impl fmt::Display for StateKey {
    /// Lowercase hex of every byte.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.bytes.iter() {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StateKey({self})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Coord, Goal};

    fn pawns() -> [Pawn; 2] {
        [
            Pawn::new(Coord::new(8, 4), 10, Goal::Row(0)),
            Pawn::new(Coord::new(0, 4), 10, Goal::Row(8)),
        ]
    }

    #[test]
    fn test_layout() {
        let key = StateKey::new(1, &pawns(), [true, false, true, true, true, true, true, true, true]);

        assert_eq!(key.player(), 1);
        assert_eq!(key.num_pawns(), 2);
        assert_eq!(&key.as_bytes()[..7], &[1, 8, 4, 10, 0, 4, 10]);
        assert_eq!(key.passages(), &[0b1111_1101, 0b1]);
    }

    #[test]
    fn test_reachability() {
        let open = StateKey::new(0, &pawns(), [true; 16]);
        let mut passages = [true; 16];
        passages[2] = false;
        passages[3] = false;
        let walled = StateKey::new(1, &pawns(), passages);

        // Adding walls only closes passages, so the walled state can follow the open one
        assert!(walled.is_reachable_from(&open));
        assert!(!open.is_reachable_from(&walled));
        assert!(walled.is_reachable_from(&walled));
    }

    #[test]
    fn test_placement_ignores_turn_and_walls() {
        let mut spent = pawns();
        spent[0].walls = 3;

        let a = StateKey::new(0, &pawns(), [true; 8]);
        let b = StateKey::new(1, &spent, [true; 8]);

        assert_ne!(a, b);
        assert_eq!(a.placement(), b.placement());
    }

    #[test]
    fn test_topology_ignores_pawns() {
        let mut moved = pawns();
        moved[0].coord = Coord::new(7, 4);

        let a = StateKey::new(0, &pawns(), [true; 8]);
        let b = StateKey::new(1, &moved, [true; 8]);
        let walled = StateKey::new(0, &pawns(), [false; 8]);

        assert_ne!(a.placement(), b.placement());
        assert_eq!(a.topology(), b.topology());
        assert_ne!(a.topology(), walled.topology());
        assert!(walled.topology().is_reachable_from(&a));
    }
}
