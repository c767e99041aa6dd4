use super::id::DbObjectId;
use crate::error::{DiffError, Result};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerTiming {
    Before,
    After,
    InsteadOf,
}

impl TriggerTiming {
    pub fn keyword(&self) -> &'static str {
        match self {
            TriggerTiming::Before => "BEFORE",
            TriggerTiming::After => "AFTER",
            TriggerTiming::InsteadOf => "INSTEAD OF",
        }
    }
}

impl FromStr for TriggerTiming {
    type Err = DiffError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().replace('_', " ").as_str() {
            "BEFORE" => Ok(TriggerTiming::Before),
            "AFTER" => Ok(TriggerTiming::After),
            "INSTEAD OF" => Ok(TriggerTiming::InsteadOf),
            _ => Err(DiffError::unknown("trigger timing", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerEvent {
    Insert,
    Update,
    Delete,
    Truncate,
}

impl TriggerEvent {
    pub fn keyword(&self) -> &'static str {
        match self {
            TriggerEvent::Insert => "INSERT",
            TriggerEvent::Update => "UPDATE",
            TriggerEvent::Delete => "DELETE",
            TriggerEvent::Truncate => "TRUNCATE",
        }
    }
}

impl FromStr for TriggerEvent {
    type Err = DiffError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "INSERT" => Ok(TriggerEvent::Insert),
            "UPDATE" => Ok(TriggerEvent::Update),
            "DELETE" => Ok(TriggerEvent::Delete),
            "TRUNCATE" => Ok(TriggerEvent::Truncate),
            _ => Err(DiffError::unknown("trigger event", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerLevel {
    Row,
    Statement,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trigger {
    pub schema: String,
    pub name: String,
    pub table: String,
    pub timing: TriggerTiming,
    pub events: Vec<TriggerEvent>,
    pub level: TriggerLevel,
    pub function: String,
    pub sql_format: Option<String>,
}

impl Trigger {
    pub fn id(&self) -> DbObjectId {
        DbObjectId::Trigger {
            schema: self.schema.clone(),
            table: self.table.clone(),
            name: self.name.clone(),
        }
    }

    pub fn applies_to(&self, sql_format: &str) -> bool {
        self.sql_format.as_deref().is_none_or(|f| f == sql_format)
    }

    /// One trigger per event, for dialects that reject combined event lists.
    pub fn split_by_event(&self) -> Vec<Trigger> {
        if self.events.len() <= 1 {
            return vec![self.clone()];
        }
        self.events
            .iter()
            .map(|event| Trigger {
                name: format!("{}_{}", self.name, event.keyword().to_lowercase()),
                events: vec![*event],
                ..self.clone()
            })
            .collect()
    }
}
