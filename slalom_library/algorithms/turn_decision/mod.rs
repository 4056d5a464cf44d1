//! Turn decision
//!
//! Compares the left and right clearance estimates and picks a turn direction.
//! The vehicle turns away from the side whose arc scanned the *shorter* mean
//! distance: left < right turns right, right < left turns left. Equal estimates
//! (including two all-sentinel arcs) yield [`TurnDecision::Undecided`] and the
//! vehicle does not turn.
//!
//! # Example
//!
//! ```rust
//! use slalom_library::algorithms::clearance::ClearanceEstimate;
//! use slalom_library::algorithms::turn_decision::{decide, TurnDecision};
//!
//! let left = ClearanceEstimate::from_cm(80.0);
//! let right = ClearanceEstimate::from_cm(30.0);
//!
//! assert_eq!(decide(left, right), TurnDecision::Left);
//! assert_eq!(decide(right, left), TurnDecision::Right);
//! ```

use crate::algorithms::clearance::ClearanceEstimate;
use std::fmt;

/// Outcome of comparing both sides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TurnDecision {
    Left,
    Right,
    /// Both sides measured exactly the same; no turn is made
    Undecided,
}

impl TurnDecision {
    /// The decision with left and right exchanged
    pub fn mirrored(self) -> Self {
        match self {
            TurnDecision::Left => TurnDecision::Right,
            TurnDecision::Right => TurnDecision::Left,
            TurnDecision::Undecided => TurnDecision::Undecided,
        }
    }
}

impl fmt::Display for TurnDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TurnDecision::Left => write!(f, "left"),
            TurnDecision::Right => write!(f, "right"),
            TurnDecision::Undecided => write!(f, "undecided"),
        }
    }
}

/// Pick a turn direction from the left and right clearance estimates
pub fn decide(left: ClearanceEstimate, right: ClearanceEstimate) -> TurnDecision {
    if left < right {
        TurnDecision::Right
    } else if right < left {
        TurnDecision::Left
    } else {
        TurnDecision::Undecided
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cm(value: f64) -> ClearanceEstimate {
        ClearanceEstimate::from_cm(value)
    }

    #[test]
    fn test_left_shorter_turns_right() {
        assert_eq!(decide(cm(30.0), cm(80.0)), TurnDecision::Right);
    }

    #[test]
    fn test_right_shorter_turns_left() {
        assert_eq!(decide(cm(80.0), cm(30.0)), TurnDecision::Left);
    }

    #[test]
    fn test_tie_is_undecided() {
        for value in [0.0, 19.5, 100.0, 1e6] {
            assert_eq!(decide(cm(value), cm(value)), TurnDecision::Undecided);
        }
    }

    #[test]
    fn test_swap_mirrors_decision() {
        let pairs = [(10.0, 20.0), (55.5, 55.4), (100.0, 100.0), (0.0, 400.0)];
        for (l, r) in pairs {
            assert_eq!(decide(cm(l), cm(r)), decide(cm(r), cm(l)).mirrored());
        }
    }

    #[test]
    fn test_tiny_difference_still_decides() {
        assert_eq!(decide(cm(50.0), cm(50.000001)), TurnDecision::Right);
    }

    #[test]
    fn test_nan_is_undecided() {
        assert_eq!(decide(cm(f64::NAN), cm(10.0)), TurnDecision::Undecided);
    }
}
