//! Pure computational algorithms for obstacle avoidance
//!
//! No I/O in here: every function takes readings in and hands numbers or
//! decisions back, so the control nodes and tests can share them.
//!
//! - **range_filter**: sentinel substitution for raw range readings
//! - **clearance**: mean filtered distance over one scan arc
//! - **turn_decision**: pick a turn direction from two clearance estimates

pub mod clearance;
pub mod range_filter;
pub mod turn_decision;
