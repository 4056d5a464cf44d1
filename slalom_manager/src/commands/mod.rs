pub mod config;
pub mod finale;
pub mod run;
pub mod scan;
