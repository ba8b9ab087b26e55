pub mod aggregators;
pub mod chains;
pub mod config;
pub mod errors;
pub mod indexer;
pub mod replay;
pub mod retry;
pub mod store;
pub mod types;
