use super::id::QualifiedName;
use crate::error::{DiffError, Result};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConstraintKind {
    PrimaryKey,
    Unique,
    Check,
    ForeignKey,
}

impl ConstraintKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            ConstraintKind::PrimaryKey => "PRIMARY KEY",
            ConstraintKind::Unique => "UNIQUE",
            ConstraintKind::Check => "CHECK",
            ConstraintKind::ForeignKey => "FOREIGN KEY",
        }
    }
}

impl FromStr for ConstraintKind {
    type Err = DiffError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().replace('_', " ").as_str() {
            "PRIMARY KEY" | "PRIMARYKEY" => Ok(ConstraintKind::PrimaryKey),
            "UNIQUE" => Ok(ConstraintKind::Unique),
            "CHECK" => Ok(ConstraintKind::Check),
            "FOREIGN KEY" | "FOREIGNKEY" => Ok(ConstraintKind::ForeignKey),
            _ => Err(DiffError::unknown("constraint type", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferentialAction {
    NoAction,
    Restrict,
    Cascade,
    SetNull,
    SetDefault,
}

impl ReferentialAction {
    pub fn keyword(&self) -> &'static str {
        match self {
            ReferentialAction::NoAction => "NO ACTION",
            ReferentialAction::Restrict => "RESTRICT",
            ReferentialAction::Cascade => "CASCADE",
            ReferentialAction::SetNull => "SET NULL",
            ReferentialAction::SetDefault => "SET DEFAULT",
        }
    }
}

impl FromStr for ReferentialAction {
    type Err = DiffError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().replace('_', " ").as_str() {
            "NO ACTION" => Ok(ReferentialAction::NoAction),
            "RESTRICT" => Ok(ReferentialAction::Restrict),
            "CASCADE" => Ok(ReferentialAction::Cascade),
            "SET NULL" => Ok(ReferentialAction::SetNull),
            "SET DEFAULT" => Ok(ReferentialAction::SetDefault),
            _ => Err(DiffError::unknown("referential action", s)),
        }
    }
}

impl fmt::Display for ReferentialAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstraintBody {
    /// Column list of a derived primary key.
    Columns(Vec<String>),
    /// Inline column foreign key; the target table lives in `Constraint::references`.
    ForeignKey {
        columns: Vec<String>,
        target_columns: Vec<String>,
    },
    /// Emulated enum column on dialects without enum types.
    EnumCheck { column: String, values: Vec<String> },
    /// Definition fragment written in the document, following the kind keyword.
    Raw(String),
}

#[derive(Debug, Clone)]
pub struct Constraint {
    pub name: String,
    pub kind: ConstraintKind,
    pub body: ConstraintBody,
    pub references: Option<QualifiedName>,
    pub on_delete: Option<ReferentialAction>,
    pub on_update: Option<ReferentialAction>,
}

impl Constraint {
    /// Structural equality: raw definitions compare modulo whitespace and case.
    pub fn same_definition(&self, other: &Constraint) -> bool {
        if self.kind != other.kind
            || self.references != other.references
            || self.on_delete != other.on_delete
            || self.on_update != other.on_update
        {
            return false;
        }
        match (&self.body, &other.body) {
            (ConstraintBody::Raw(a), ConstraintBody::Raw(b)) => {
                normalize_definition(a) == normalize_definition(b)
            }
            (a, b) => a == b,
        }
    }

    /// Whether the constraint definition mentions `column` as a whole word.
    pub fn references_column(&self, column: &str) -> bool {
        match &self.body {
            ConstraintBody::Columns(columns) => columns.iter().any(|c| c == column),
            ConstraintBody::ForeignKey { columns, .. } => columns.iter().any(|c| c == column),
            ConstraintBody::EnumCheck { column: c, .. } => c == column,
            ConstraintBody::Raw(definition) => contains_word(definition, column),
        }
    }
}

fn normalize_definition(definition: &str) -> String {
    let mut out = String::with_capacity(definition.len());
    let mut last_space = true;
    for ch in definition.trim().chars() {
        if ch.is_whitespace() {
            if !last_space {
                out.push(' ');
            }
            last_space = true;
        } else {
            // drop spaces around punctuation so "(a,b)" and "( a, b )" agree
            if matches!(ch, '(' | ')' | ',') && out.ends_with(' ') {
                out.pop();
            }
            out.push(ch.to_ascii_lowercase());
            last_space = matches!(ch, '(' | ',');
        }
    }
    out.trim_end().to_string()
}

fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

/// Case-insensitive whole-word search, tolerant of quoting characters.
pub fn contains_word(haystack: &str, word: &str) -> bool {
    if word.is_empty() {
        return false;
    }
    let hay = haystack.to_lowercase();
    let needle = word.to_lowercase();
    let mut start = 0;
    while let Some(pos) = hay[start..].find(&needle) {
        let begin = start + pos;
        let end = begin + needle.len();
        let before_ok = hay[..begin].chars().next_back().is_none_or(|c| !is_word_char(c));
        let after_ok = hay[end..].chars().next().is_none_or(|c| !is_word_char(c));
        if before_ok && after_ok {
            return true;
        }
        start = begin + needle.len().max(1);
    }
    false
}
