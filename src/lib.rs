pub mod config;
pub mod display;
pub mod errors;
pub mod pipeline;
pub mod plan;
pub mod report;
pub mod runner;
pub mod samples;
pub mod stats;
pub mod types;
