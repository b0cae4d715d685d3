use common::SymqlError;
use index::service::SymbolIndex;
use std::collections::HashMap;
use std::sync::Arc;
use vtab::module::MODULE_NAME;
use vtab::{Module, VirtualTable};

/// Name of the only database the shell knows.
const DATABASE: &str = "main";

/// Tables attached to the shell, by lower-cased name.
pub struct Catalog {
    tables: HashMap<String, VirtualTable>,
    default_addr: Option<String>,
}

impl Catalog {
    /// Creates an empty catalog.
    ///
    /// # Arguments
    ///
    /// * `default_addr` - Address used when an attach names none.
    pub fn new(default_addr: Option<String>) -> Self {
        Self {
            tables: HashMap::new(),
            default_addr,
        }
    }

    /// Attaches a table served by the index at `addr`, or at the default
    /// address.
    pub fn attach(&mut self, name: &str, kind: &str, addr: Option<&str>) -> Result<(), SymqlError> {
        let addr = match addr.or_else(|| self.default_addr.as_deref()) {
            Some(addr) => addr.to_string(),
            None => {
                return Err(SymqlError::SetupError(format!(
                    "No server address for table {}",
                    name
                )))
            }
        };
        self.check_free(name)?;
        let table = Module::create(&[MODULE_NAME, DATABASE, name, kind, &addr])?;
        self.insert(table);
        Ok(())
    }

    /// Attaches a table served by `index`.
    pub fn attach_with_index(
        &mut self,
        name: &str,
        kind: &str,
        index: Arc<dyn SymbolIndex>,
    ) -> Result<(), SymqlError> {
        self.check_free(name)?;
        let table = Module::create_with_index(&[MODULE_NAME, DATABASE, name, kind, "local"], index)?;
        self.insert(table);
        Ok(())
    }

    fn check_free(&self, name: &str) -> Result<(), SymqlError> {
        if self.tables.contains_key(&name.to_lowercase()) {
            return Err(SymqlError::SetupError(format!(
                "Table {} already exists",
                name
            )));
        }
        Ok(())
    }

    fn insert(&mut self, table: VirtualTable) {
        self.tables.insert(table.name().to_lowercase(), table);
    }

    pub fn get_table(&self, name: &str) -> Result<&VirtualTable, SymqlError> {
        self.tables
            .get(&name.to_lowercase())
            .ok_or_else(|| SymqlError::ValidationError(format!("Unknown table {}", name)))
    }

    /// Attached table names, sorted.
    pub fn table_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tables.values().map(|t| t.name()).collect();
        names.sort_unstable();
        names
    }
}
