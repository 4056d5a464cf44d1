//! Control loop stages
//!
//! Each node owns a slice of the per-obstacle sequence and drives a
//! [`Vehicle`](slalom_core::Vehicle) handed to it by the caller. Nodes hold
//! configuration only; nothing carries over from one obstacle to the next.
//!
//! - `ApproachController` - drive forward until something is within the stop distance
//! - `ArcScanner` - sweep the mast over one side and collect readings
//! - `ObstacleNavigator` - approach, scan both sides, decide, turn
//! - `CourseRunner` - run the navigator once per obstacle on the course
//! - `Finale` - timed shuffle after the course

pub mod approach;
pub mod arc_scanner;
pub mod course;
pub mod finale;
pub mod navigator;
