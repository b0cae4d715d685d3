#[macro_use]
extern crate log;
#[macro_use]
extern crate serde;
use clap::{App, Arg};
use env_logger::Env;

use index::memory::MemoryIndex;
use index::server::IndexServer;
use std::fs;
use std::process;
use std::sync::Arc;

#[derive(Deserialize, Debug)]
struct IndexServerConfig {
    host: String,
    port: String,
    dump: Option<String>,
}

/// Serves an index dump over the line protocol.
fn main() {
    env_logger::from_env(Env::default().default_filter_or("info")).init();

    let matches = App::new("index-server")
        .version(env!("CARGO_PKG_VERSION"))
        .author(env!("CARGO_PKG_AUTHORS"))
        .about("Serves a JSON symbol index dump to symql clients")
        .arg(
            Arg::with_name("config")
                .short("c")
                .long("config")
                .value_name("FILE")
                .help("Sets a custom config file")
                .takes_value(true)
                .required(false),
        )
        .arg(
            Arg::with_name("host")
                .short("h")
                .long("host")
                .value_name("host")
                .default_value("127.0.0.1")
                .help("Server IP address")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("port")
                .short("p")
                .long("port")
                .value_name("port")
                .default_value("50051")
                .help("Server port number")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("dump")
                .short("d")
                .long("dump")
                .value_name("FILE")
                .help("JSON index dump to serve")
                .takes_value(true),
        )
        .get_matches();

    let config = if let Some(path) = matches.value_of("config") {
        let parsed = fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|c| serde_json::from_str(&c).map_err(|e| e.to_string()));
        match parsed {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to read config {}: {}", path, e);
                process::exit(1);
            }
        }
    } else {
        IndexServerConfig {
            host: matches.value_of("host").unwrap_or("127.0.0.1").to_string(),
            port: matches.value_of("port").unwrap_or("50051").to_string(),
            dump: matches.value_of("dump").map(String::from),
        }
    };

    info!("Starting index server... {:?}", config);

    let index = match &config.dump {
        Some(path) => match MemoryIndex::load(path) {
            Ok(index) => index,
            Err(e) => {
                error!("Failed to load {}: {}", path, e);
                process::exit(1);
            }
        },
        None => {
            warn!("No dump given, serving an empty index");
            MemoryIndex::new()
        }
    };

    let bind_addr = format!("{}:{}", config.host, config.port);
    let server = match IndexServer::bind(&bind_addr, Arc::new(index)) {
        Ok(server) => server,
        Err(e) => {
            error!("{}", e);
            process::exit(1);
        }
    };
    info!("Index server listening on {}", bind_addr);
    server.serve();
}
