use crate::constraint::Constraint;
use crate::cursor::Cursor;
use crate::plan::Plan;
use crate::planner::best_plan;
use crate::schema::{relations_schema, refs_schema, symbols_schema};
use common::{SymqlError, TableSchema};
use index::request::RelationKind;
use index::service::SymbolIndex;
use std::fmt;
use std::sync::Arc;

/// The closed set of table kinds, chosen when the table is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    Symbols,
    Refs,
    Relations(RelationKind),
}

impl TableKind {
    /// Parses the kind argument of a table definition.
    pub fn parse(kind: &str) -> Result<Self, SymqlError> {
        match kind.trim().to_lowercase().as_str() {
            "symbols" => Ok(TableKind::Symbols),
            "refs" => Ok(TableKind::Refs),
            "base_of" => Ok(TableKind::Relations(RelationKind::BaseOf)),
            "overridden_by" => Ok(TableKind::Relations(RelationKind::OverriddenBy)),
            _ => Err(SymqlError::SetupError(format!(
                "Unknown table kind {:?}, expected symbols, refs, base_of or overridden_by",
                kind
            ))),
        }
    }

    pub fn schema(self) -> TableSchema {
        match self {
            TableKind::Symbols => symbols_schema(),
            TableKind::Refs => refs_schema(),
            TableKind::Relations(_) => relations_schema(),
        }
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableKind::Symbols => write!(f, "symbols"),
            TableKind::Refs => write!(f, "refs"),
            TableKind::Relations(kind) => write!(f, "{}", kind),
        }
    }
}

/// A read-only table backed by a symbol index.
pub struct VirtualTable {
    name: String,
    kind: TableKind,
    schema: TableSchema,
    index: Arc<dyn SymbolIndex>,
}

impl VirtualTable {
    /// Creates a table of `kind` served by `index`.
    ///
    /// # Arguments
    ///
    /// * `name` - Table name.
    /// * `kind` - Table kind.
    /// * `index` - Index answering the table's remote calls.
    pub fn new(name: &str, kind: TableKind, index: Arc<dyn SymbolIndex>) -> Self {
        Self {
            name: name.to_string(),
            kind,
            schema: kind.schema(),
            index,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> TableKind {
        self.kind
    }

    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    /// Plans an access for the given constraints. Never performs I/O.
    pub fn best_index(&self, constraints: &[Constraint]) -> Plan {
        best_plan(self.kind, constraints)
    }

    /// Opens a fresh cursor. No remote call is made until the first filter.
    pub fn open(&self) -> Cursor {
        Cursor::new(self.kind, Arc::clone(&self.index))
    }
}

impl fmt::Display for VirtualTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}) {}", self.name, self.kind, self.schema)
    }
}
