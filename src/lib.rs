pub mod bracket;
pub mod cache;
pub mod classifier;
pub mod config;
pub mod engine;
pub mod error;
pub mod export;
pub mod group_stage;
pub mod import;
pub mod knockout;
pub mod model;
pub mod report;
pub mod schedule;
pub mod standings;
pub mod store;
pub mod winner_bonus;
