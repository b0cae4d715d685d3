//! Table creation from host-supplied arguments.

use crate::table::{TableKind, VirtualTable};
use common::SymqlError;
use index::channel::get_channel;
use index::service::SymbolIndex;
use std::sync::Arc;

/// Name the module is registered under.
pub const MODULE_NAME: &str = "symql";

/// Number of arguments in a table definition:
/// module, database, table, kind and server address.
pub const TABLE_ARGS: usize = 5;

/// Strips one layer of matching SQL quotes.
fn unquote(arg: &str) -> &str {
    let arg = arg.trim();
    for quote in &['\'', '"'] {
        if arg.len() >= 2 && arg.starts_with(*quote) && arg.ends_with(*quote) {
            return &arg[1..arg.len() - 1];
        }
    }
    arg
}

/// Entry point for creating symql tables.
pub struct Module;

impl Module {
    /// Creates a table whose index is the shared client for the address
    /// named in `args`.
    ///
    /// # Arguments
    ///
    /// * `args` - Module name, database name, table name, kind and address.
    pub fn create(args: &[&str]) -> Result<VirtualTable, SymqlError> {
        let (name, kind, addr) = Self::parse_args(args)?;
        let index = get_channel(addr)?;
        info!("Created {} table {} on {}", kind, name, addr);
        Ok(VirtualTable::new(name, kind, index))
    }

    /// Like [`Module::create`], but served by an index the caller provides.
    /// The address argument is still required and validated.
    pub fn create_with_index(
        args: &[&str],
        index: Arc<dyn SymbolIndex>,
    ) -> Result<VirtualTable, SymqlError> {
        let (name, kind, addr) = Self::parse_args(args)?;
        info!("Created {} table {} for {}", kind, name, addr);
        Ok(VirtualTable::new(name, kind, index))
    }

    fn parse_args<'a>(args: &[&'a str]) -> Result<(&'a str, TableKind, &'a str), SymqlError> {
        if args.len() != TABLE_ARGS {
            return Err(SymqlError::SetupError(format!(
                "Expected {} arguments (module, database, table, kind, address), got {}",
                TABLE_ARGS,
                args.len()
            )));
        }
        let name = unquote(args[2]);
        if name.is_empty() {
            return Err(SymqlError::SetupError(String::from("Table name is empty")));
        }
        let kind = TableKind::parse(unquote(args[3]))?;
        let addr = unquote(args[4]);
        if addr.is_empty() {
            return Err(SymqlError::SetupError(String::from(
                "Server address is empty",
            )));
        }
        Ok((name, kind, addr))
    }
}
