//! Window parameters and the monotonic-deque rolling extreme.

use std::{collections::VecDeque, num::NonZeroUsize};

use nonzero_ext::nonzero;
use serde::{Deserialize, Serialize};

use crate::derive::DeriveError;

/// Default trailing window, in bars.
pub const DEFAULT_LOOKBACK: usize = 7;
/// Default forward window, in bars.
pub const DEFAULT_LOOKAHEAD: usize = 5;

/// Backward (`W`) and forward (`F`) window sizes, both at least one bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawWindowSpec", into = "RawWindowSpec")]
pub struct WindowSpec {
    lookback: NonZeroUsize,
    lookahead: NonZeroUsize,
}

#[derive(Serialize, Deserialize)]
struct RawWindowSpec {
    lookback: usize,
    lookahead: usize,
}

impl WindowSpec {
    pub fn new(lookback: usize, lookahead: usize) -> Result<Self, DeriveError> {
        let lookback = NonZeroUsize::new(lookback).ok_or(DeriveError::InvalidParameter {
            name: "lookback",
            value: lookback,
        })?;
        let lookahead = NonZeroUsize::new(lookahead).ok_or(DeriveError::InvalidParameter {
            name: "lookahead",
            value: lookahead,
        })?;
        Ok(Self {
            lookback,
            lookahead,
        })
    }

    pub const fn lookback(&self) -> usize {
        self.lookback.get()
    }

    pub const fn lookahead(&self) -> usize {
        self.lookahead.get()
    }

    pub const fn lookback_nonzero(&self) -> NonZeroUsize {
        self.lookback
    }

    pub const fn lookahead_nonzero(&self) -> NonZeroUsize {
        self.lookahead
    }
}

impl Default for WindowSpec {
    fn default() -> Self {
        Self {
            lookback: nonzero!(7usize),
            lookahead: nonzero!(5usize),
        }
    }
}

impl TryFrom<RawWindowSpec> for WindowSpec {
    type Error = DeriveError;

    fn try_from(raw: RawWindowSpec) -> Result<Self, Self::Error> {
        Self::new(raw.lookback, raw.lookahead)
    }
}

impl From<WindowSpec> for RawWindowSpec {
    fn from(spec: WindowSpec) -> Self {
        Self {
            lookback: spec.lookback(),
            lookahead: spec.lookahead(),
        }
    }
}

/// Which end of the value range a window tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extreme {
    Max,
    Min,
}

impl Extreme {
    /// Whether `candidate` displaces `incumbent`. Ties go to the candidate,
    /// which is always the more recent of the two.
    fn displaces(self, candidate: f64, incumbent: f64) -> bool {
        match self {
            Extreme::Max => candidate >= incumbent,
            Extreme::Min => candidate <= incumbent,
        }
    }
}

/// The extreme of one window and the index where it was most recently attained.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowExtreme {
    pub index: usize,
    pub value: f64,
}

/// Extremes over the trailing window `[max(0, i + 1 - window), i]` for every `i`.
///
/// Windows at the start of the slice are truncated to the available prefix.
/// Runs in O(n): the deque holds indices whose values are strictly monotonic
/// from front to back, so the front is the window's extreme and, among equal
/// values, the latest index.
pub fn trailing_extremes(
    values: &[f64],
    window: NonZeroUsize,
    extreme: Extreme,
) -> Vec<WindowExtreme> {
    let window = window.get();
    let mut deque: VecDeque<usize> = VecDeque::with_capacity(window);
    let mut out = Vec::with_capacity(values.len());

    for (i, &value) in values.iter().enumerate() {
        while deque.back().is_some_and(|&j| extreme.displaces(value, values[j])) {
            deque.pop_back();
        }
        deque.push_back(i);

        while deque.front().is_some_and(|&j| j + window <= i) {
            deque.pop_front();
        }

        // `i` itself is never expired, so the deque is non-empty here.
        let index = deque[0];
        out.push(WindowExtreme {
            index,
            value: values[index],
        });
    }

    out
}
