pub mod build;
pub mod config;
pub mod diff;
pub mod error_handling;
pub mod order;
