#[macro_use]
extern crate log;
#[macro_use]
extern crate serde;
extern crate clap;
extern crate rustyline;

mod catalog;
mod commands;
mod conductor;
mod executor;
mod translate;

use catalog::Catalog;
use clap::{App, Arg};
use common::SymqlError;
use conductor::{Conductor, Response};
use env_logger::Env;
use rustyline::error::ReadlineError;
use rustyline::Editor;
use std::fs;

/// A table to attach at startup.
#[derive(Deserialize, Debug)]
struct TableConfig {
    name: String,
    kind: String,
    addr: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
struct ShellConfig {
    /// Index server used by tables that name none.
    addr: Option<String>,
    #[serde(default)]
    tables: Vec<TableConfig>,
}

/// Runs one line and prints its output. Returns false once the shell
/// should stop.
fn process_input(conductor: &mut Conductor, line: &str) -> bool {
    match conductor.process(line) {
        Response::Output(out) => {
            println!("{}", out);
            true
        }
        Response::Quit => {
            info!("Received Quit Command");
            false
        }
    }
}

fn process_cli_input(conductor: &mut Conductor) {
    let mut rl = Editor::<()>::new();
    if rl.load_history("history.txt").is_err() {
        info!("No previous history.");
    }
    let prompt: &str = "[symql]>>";
    loop {
        match rl.readline(prompt) {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                rl.add_history_entry(line.as_str());
                if !process_input(conductor, &line) {
                    break;
                }
            }
            Err(ReadlineError::Interrupted) => {
                info!("CTRL-C");
                break;
            }
            Err(ReadlineError::Eof) => {
                info!("CTRL-D");
                break;
            }
            Err(err) => {
                error!("Error: {:?}", err);
                break;
            }
        }
    }
    if let Err(e) = rl.save_history("history.txt") {
        warn!("Could not save history: {}", e);
    }
}

/// Runs a semicolon delimited script of commands and queries.
fn process_script_input(conductor: &mut Conductor, script: &str) {
    for line in script.split(';') {
        let command = line.trim();
        if command.is_empty() {
            continue;
        }
        let clean_command = command.replace("\n", " ");
        info!("Script clean command: {}", clean_command);
        if !process_input(conductor, &clean_command) {
            break;
        }
    }
}

fn load_config(path: Option<&str>) -> Result<ShellConfig, SymqlError> {
    match path {
        Some(path) => {
            let contents = fs::read_to_string(path)?;
            Ok(serde_json::from_str(&contents)?)
        }
        None => Ok(ShellConfig::default()),
    }
}

fn build_catalog(config: ShellConfig) -> Result<Catalog, SymqlError> {
    let mut catalog = Catalog::new(config.addr);
    for table in config.tables {
        catalog.attach(&table.name, &table.kind, table.addr.as_deref())?;
        info!("Attached {} ({})", table.name, table.kind);
    }
    Ok(catalog)
}

fn main() {
    // Configure log environment
    env_logger::from_env(Env::default().default_filter_or("info")).init();

    let matches = App::new(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .author(env!("CARGO_PKG_AUTHORS"))
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .arg(
            Arg::with_name("config")
                .short("c")
                .long("config")
                .value_name("FILE")
                .help("JSON file with the server address and tables to attach")
                .takes_value(true)
                .required(false),
        )
        .arg(
            Arg::with_name("addr")
                .short("a")
                .long("addr")
                .value_name("HOST:PORT")
                .help("Default index server address")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("script")
                .short("s")
                .long("script")
                .value_name("SYMQL_SCRIPT")
                .help("Takes in a semicolon delimited file of commands and SQL queries.")
                .takes_value(true)
                .required(false),
        )
        .arg(
            Arg::with_name("command")
                .short("e")
                .long("command")
                .value_name("SQL")
                .help("Runs a single command or query and exits")
                .takes_value(true)
                .required(false),
        )
        .get_matches();

    let mut config = match load_config(matches.value_of("config")) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to read config: {}", e);
            return;
        }
    };
    if let Some(addr) = matches.value_of("addr") {
        config.addr = Some(addr.to_string());
    }
    info!("Starting shell with config: {:?}", config);

    let catalog = match build_catalog(config) {
        Ok(catalog) => catalog,
        Err(e) => {
            error!("Failed to attach tables: {}", e);
            return;
        }
    };
    let mut conductor = Conductor::new(catalog);

    if let Some(cmd) = matches.value_of("command") {
        process_input(&mut conductor, cmd);
    } else if let Some(path) = matches.value_of("script") {
        match fs::read_to_string(path) {
            Ok(script) => process_script_input(&mut conductor, &script),
            Err(e) => error!("Failed to read script {}: {}", path, e),
        }
    } else {
        process_cli_input(&mut conductor);
    }
    info!("Terminated.");
}
