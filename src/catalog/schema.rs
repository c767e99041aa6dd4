use super::custom_type::EnumType;
use super::function::Function;
use super::grant::Grant;
use super::sequence::Sequence;
use super::table::Table;
use super::triggers::Trigger;
use super::view::View;

#[derive(Debug, Clone)]
pub struct Schema {
    pub name: String,
    pub owner: Option<String>,
    pub tables: Vec<Table>,
    pub sequences: Vec<Sequence>,
    pub types: Vec<EnumType>,
    pub views: Vec<View>,
    pub functions: Vec<Function>,
    /// Triggers are declared at schema level and name their table.
    pub triggers: Vec<Trigger>,
    pub grants: Vec<Grant>,
}

impl Schema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            owner: None,
            tables: Vec::new(),
            sequences: Vec::new(),
            types: Vec::new(),
            views: Vec::new(),
            functions: Vec::new(),
            triggers: Vec::new(),
            grants: Vec::new(),
        }
    }

    pub fn find_table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }

    pub fn find_sequence(&self, name: &str) -> Option<&Sequence> {
        self.sequences.iter().find(|s| s.name == name)
    }

    pub fn find_type(&self, name: &str) -> Option<&EnumType> {
        self.types.iter().find(|t| t.name == name)
    }

    pub fn find_view(&self, name: &str) -> Option<&View> {
        self.views.iter().find(|v| v.name == name)
    }

    pub fn triggers_for<'a>(&'a self, table: &'a str) -> impl Iterator<Item = &'a Trigger> + 'a {
        self.triggers.iter().filter(move |t| t.table == table)
    }
}
