pub mod data;
pub mod dialects;
pub mod enums;
pub mod idempotence;
pub mod ordering;
pub mod renames;
pub mod staging;
