// Integration tests for dbdiff

pub mod cli;
pub mod diff;
pub mod fixtures;
pub mod helpers;
