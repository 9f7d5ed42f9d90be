pub mod allocator;
pub mod client;
pub mod config;
pub mod issues;
pub mod ledger;
pub mod models;
pub mod sync;
