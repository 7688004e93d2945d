/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use crate::MAX_LEVEL;

/// A numerical representation of how good a position is for the side to move, in units of moves.
///
/// A positive score means the side to move is ahead in the race to its goal.
///
/// This value is internally capped at [`Self::INF`].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct Score(pub i32);

impl Score {
    /// Largest possible score ever achievable.
    pub const INF: Self = Self(i16::MAX as i32);

    /// Score of reaching the goal in the current position.
    pub const WIN: Self = Self(Self::INF.0 - 1);

    /// Score of an even race.
    pub const EVEN: Self = Self(0);

    /// Lowest possible score for a win.
    ///
    /// This is only obtainable if the goal can be reached within [`MAX_LEVEL`] plies.
    pub const LOWEST_WIN: Self = Self(Self::WIN.0 - MAX_LEVEL as i32 - 1);

    /// Returns `true` if the score is a win (or a loss) found by the search.
    #[inline(always)]
    pub fn is_win(&self) -> bool {
        self.abs() >= Self::LOWEST_WIN
    }

    /// Returns the number of plies this score is from a pawn reaching its goal.
    #[inline(always)]
    pub const fn plies_to_win(&self) -> i32 {
        Self::WIN.0 - self.0.abs()
    }

    /// Returns the absolute value of this [`Score`].
    #[inline(always)]
    pub const fn abs(self) -> Self {
        Self(self.0.abs())
    }
}

impl From<u16> for Score {
    #[inline(always)]
    fn from(value: u16) -> Self {
        Self(value as i32)
    }
}

macro_rules! impl_binary_op {
    ($trait:tt, $fn:ident) => {
        impl std::ops::$trait for Score {
            type Output = Self;

            #[inline(always)]
            fn $fn(self, rhs: Self) -> Self::Output {
                Self(self.0.$fn(rhs.0))
            }
        }

        impl std::ops::$trait<i32> for Score {
            type Output = Self;

            #[inline(always)]
            fn $fn(self, rhs: i32) -> Self::Output {
                Self(self.0.$fn(rhs))
            }
        }
    };
}

macro_rules! impl_binary_op_assign {
    ($trait:tt, $fn:ident) => {
        impl std::ops::$trait for Score {
            #[inline(always)]
            fn $fn(&mut self, rhs: Self) {
                self.0.$fn(rhs.0);
            }
        }

        impl std::ops::$trait<i32> for Score {
            #[inline(always)]
            fn $fn(&mut self, rhs: i32) {
                self.0.$fn(rhs);
            }
        }
    };
}

impl_binary_op!(Add, add);
impl_binary_op!(Sub, sub);

impl_binary_op_assign!(AddAssign, add_assign);
impl_binary_op_assign!(SubAssign, sub_assign);

impl std::ops::Neg for Score {
    type Output = Self;

    #[inline(always)]
    fn neg(self) -> Self::Output {
        Self(self.0.neg())
    }
}

impl PartialEq<i32> for Score {
    fn eq(&self, other: &i32) -> bool {
        self.0.eq(other)
    }
}

impl PartialOrd<i32> for Score {
    fn partial_cmp(&self, other: &i32) -> Option<std::cmp::Ordering> {
        self.0.partial_cmp(other)
    }
}

impl fmt::Display for Score {
    #[inline(always)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Debug for Score {
    #[inline(always)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_win() {
            let outcome = if self.0 > 0 { "win" } else { "loss" };
            write!(f, "{} ({outcome} in {} plies)", self.0, self.plies_to_win())
        } else {
            write!(f, "{}", self.0)
        }
    }
}
