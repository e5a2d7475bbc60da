pub mod availability;
pub mod cli;
pub mod data;
pub mod overlap;
pub mod parallel;
pub mod pool;
pub mod report;
pub mod search;
pub mod validate;
