pub mod checks_api;
pub mod config;
pub mod embeddings;
pub mod engine;
pub mod errors;
pub mod model;
pub mod providers;
pub mod report;
pub mod sampling;
pub mod thresholds;
