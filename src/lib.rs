//! Compile XML database definitions into staged SQL builds and upgrades for
//! PostgreSQL and SQL Server.
//!
//! The pipeline is: [`loader`] parses documents into a [`catalog::Database`],
//! [`diff`] plans the steps between two databases, [`render`] turns each step
//! into dialect SQL and [`output`] routes it into the four staged streams.

pub mod catalog;
pub mod config;
pub mod constants;
pub mod diff;
pub mod error;
pub mod loader;
pub mod output;
pub mod render;
pub mod report;

pub use diff::{build_database, diff_databases};
pub use error::{DiffError, Result};
