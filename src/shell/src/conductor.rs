use crate::catalog::Catalog;
use crate::commands::{self, Commands};
use crate::executor::{Executor, QueryResult};
use crate::translate::Translator;
use common::SymqlError;
use sqlparser::ast::Statement;
use sqlparser::parser::Parser;

/// One line of user input, classified.
pub enum Request {
    Err,
    Command(Commands),
    SQL(Vec<Statement>),
}

/// What the shell should do after a line has been processed.
#[derive(Debug, PartialEq)]
pub enum Response {
    Output(String),
    Quit,
}

/// Separates user input into commands and SQL.
///
/// # Arguments
///
/// * `cmd` - Line entered by the user.
pub fn parse_input_request(cmd: &str) -> Result<Request, SymqlError> {
    let dialect = sqlparser::dialect::GenericDialect {};
    if cmd.trim_start().starts_with('\\') {
        Ok(match commands::parse_command(cmd) {
            Some(c) => Request::Command(c),
            None => Request::Err,
        })
    } else {
        Parser::parse_sql(&dialect, cmd.to_string())
            .map(Request::SQL)
            .map_err(|e| SymqlError::ValidationError(format!("{:?}", e)))
    }
}

/// Dispatches shell input to the catalog and the executor.
pub struct Conductor {
    pub catalog: Catalog,
}

impl Conductor {
    pub fn new(catalog: Catalog) -> Self {
        Conductor { catalog }
    }

    /// Processes one line of input. Errors are reported as output so the
    /// shell keeps running.
    pub fn process(&mut self, line: &str) -> Response {
        let result = match parse_input_request(line) {
            Ok(Request::Command(Commands::Quit)) => return Response::Quit,
            Ok(Request::Command(c)) => self.run_command(c),
            Ok(Request::SQL(statements)) => self.run_sql(statements).map(|r| r.to_string()),
            Ok(Request::Err) => Err(SymqlError::ValidationError(format!(
                "Unknown command {}",
                line.trim()
            ))),
            Err(e) => Err(e),
        };
        match result {
            Ok(out) => Response::Output(out),
            Err(e) => {
                warn!("{}", e);
                Response::Output(e.to_string())
            }
        }
    }

    /// Processes a backslash command.
    ///
    /// # Arguments
    ///
    /// * `command` - Command to execute.
    pub fn run_command(&mut self, command: Commands) -> Result<String, SymqlError> {
        match command {
            Commands::Attach { name, kind, addr } => {
                info!("Processing COMMAND::Attach {} {}", name, kind);
                self.catalog.attach(&name, &kind, addr.as_deref())?;
                Ok(format!("Attached {}", self.catalog.get_table(&name)?))
            }
            Commands::Tables => {
                info!("Processing COMMAND::Tables");
                Ok(self.catalog.table_names().join("\n"))
            }
            Commands::Schema(name) => {
                info!("Processing COMMAND::Schema {}", name);
                Ok(self.catalog.get_table(&name)?.schema().to_string())
            }
            Commands::Quit => Ok(String::from("\\quit")),
        }
    }

    /// Runs the first of the parsed statements. Only queries are supported.
    ///
    /// # Arguments
    ///
    /// * `cmd` - Statements parsed from one input line.
    pub fn run_sql(&mut self, cmd: Vec<Statement>) -> Result<QueryResult, SymqlError> {
        match cmd.first() {
            None => Err(SymqlError::ValidationError(String::from(
                "Empty SQL command",
            ))),
            Some(Statement::Query(query)) => {
                info!("Processing SQL Query");
                let scan = Translator::from_sql(query, &self.catalog)?;
                debug!("Translated query: {:?}", scan);
                let table = self.catalog.get_table(&scan.table)?;
                Executor::execute(&scan, table)
            }
            Some(_) => Err(SymqlError::ValidationError(String::from(
                "Only SELECT is supported",
            ))),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use common::testutil::init;
    use index::memory::MemoryIndex;
    use index::records::Symbol;
    use std::sync::Arc;

    fn conductor() -> Conductor {
        let mut index = MemoryIndex::new();
        index.add_symbol(Symbol::named("1A", "Foo", "ns::"));
        index.add_symbol(Symbol::named("2B", "Bar", "ns::"));
        let mut catalog = Catalog::new(None);
        catalog
            .attach_with_index("syms", "symbols", Arc::new(index))
            .unwrap();
        Conductor::new(catalog)
    }

    fn output(r: Response) -> String {
        match r {
            Response::Output(s) => s,
            Response::Quit => panic!("Unexpected quit"),
        }
    }

    #[test]
    fn test_commands() {
        init();
        let mut c = conductor();
        assert_eq!(output(c.process("\\tables")), "syms");
        assert!(output(c.process("\\schema syms")).starts_with("(Id TEXT, Name TEXT"));
        assert!(output(c.process("\\schema nope")).contains("Unknown table"));
        assert!(output(c.process("\\frobnicate")).contains("Unknown command"));
        assert_eq!(c.process("\\quit"), Response::Quit);
    }

    #[test]
    fn test_select() {
        init();
        let mut c = conductor();
        let out = output(c.process("SELECT Name FROM syms WHERE ID = '2B'"));
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines, vec!["Name", "----", "Bar", "(1 rows)"]);

        let rows = c
            .run_sql(
                Parser::parse_sql(
                    &sqlparser::dialect::GenericDialect {},
                    String::from("SELECT * FROM syms"),
                )
                .unwrap(),
            )
            .unwrap();
        assert_eq!(rows.rows().len(), 2);
        assert_eq!(rows.columns().len(), vtab::schema::symbols::COUNT);
    }

    #[test]
    fn test_sql_errors() {
        init();
        let mut c = conductor();
        assert!(output(c.process("SELEC 1")).starts_with("Validation Error"));
        assert!(output(c.process("SELECT * FROM other")).contains("Unknown table"));
        assert!(c.run_sql(vec![]).is_err());
    }
}
