//! Typed migration operations.
//!
//! Differs produce [`MigrationStep`]s; a [`crate::render::Dialect`] turns each
//! step into SQL text. Steps carry snapshots of the catalog objects they
//! need so rendering never has to look anything up.

use crate::catalog::id::DbObjectId;
use crate::render::Unsupported;

pub use constraint::*;
pub use data::*;
pub use function::*;
pub use grant::*;
pub use index::*;
pub use schema::*;
pub use sequence::*;
pub use table::*;
pub use trigger::*;
pub use types::*;
pub use view::*;

pub mod constraint;
pub mod data;
pub mod function;
pub mod grant;
pub mod index;
pub mod schema;
pub mod sequence;
pub mod table;
pub mod trigger;
pub mod types;
pub mod view;

/// Main migration step - hierarchical structure for scalability
#[derive(Debug, Clone)]
#[allow(clippy::large_enum_variant)]
pub enum MigrationStep {
    Schema(SchemaOperation),
    Table(TableOperation),
    Constraint(ConstraintOperation),
    Index(IndexOperation),
    Sequence(SequenceOperation),
    Type(TypeOperation),
    Function(FunctionOperation),
    Trigger(TriggerOperation),
    View(ViewOperation),
    Grant(GrantOperation),
    Data(DataOperation),
    /// Explanatory comment written into the stage.
    Comment(String),
    /// Document-supplied SQL copied verbatim.
    Literal(String),
    /// A change the dialect cannot express, detected by a differ.
    Unsupported(Unsupported),
}

/// Identity and destructiveness of an operation, for logging and summaries
pub trait OperationInfo {
    fn db_object_id(&self) -> Option<DbObjectId>;
    fn is_destructive(&self) -> bool {
        false
    }
}

impl OperationInfo for MigrationStep {
    fn db_object_id(&self) -> Option<DbObjectId> {
        match self {
            MigrationStep::Schema(op) => op.db_object_id(),
            MigrationStep::Table(op) => op.db_object_id(),
            MigrationStep::Constraint(op) => op.db_object_id(),
            MigrationStep::Index(op) => op.db_object_id(),
            MigrationStep::Sequence(op) => op.db_object_id(),
            MigrationStep::Type(op) => op.db_object_id(),
            MigrationStep::Function(op) => op.db_object_id(),
            MigrationStep::Trigger(op) => op.db_object_id(),
            MigrationStep::View(op) => op.db_object_id(),
            MigrationStep::Grant(op) => op.db_object_id(),
            MigrationStep::Data(op) => op.db_object_id(),
            MigrationStep::Comment(_)
            | MigrationStep::Literal(_)
            | MigrationStep::Unsupported(_) => None,
        }
    }

    fn is_destructive(&self) -> bool {
        match self {
            MigrationStep::Schema(op) => op.is_destructive(),
            MigrationStep::Table(op) => op.is_destructive(),
            MigrationStep::Constraint(op) => op.is_destructive(),
            MigrationStep::Index(op) => op.is_destructive(),
            MigrationStep::Sequence(op) => op.is_destructive(),
            MigrationStep::Type(op) => op.is_destructive(),
            MigrationStep::Function(op) => op.is_destructive(),
            MigrationStep::Trigger(op) => op.is_destructive(),
            MigrationStep::View(op) => op.is_destructive(),
            MigrationStep::Grant(op) => op.is_destructive(),
            MigrationStep::Data(op) => op.is_destructive(),
            MigrationStep::Comment(_)
            | MigrationStep::Literal(_)
            | MigrationStep::Unsupported(_) => false,
        }
    }
}

impl MigrationStep {
    /// Short description for trace logging.
    pub fn describe(&self) -> String {
        match (self.db_object_id(), self) {
            (Some(id), _) => id.to_string(),
            (None, MigrationStep::Comment(_)) => "comment".to_string(),
            (None, MigrationStep::Literal(_)) => "literal sql".to_string(),
            (None, _) => "unsupported change".to_string(),
        }
    }
}
