/// Shell commands, entered with a leading backslash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// `\attach NAME KIND [ADDR]`
    Attach {
        name: String,
        kind: String,
        addr: Option<String>,
    },
    /// `\tables`
    Tables,
    /// `\schema NAME`
    Schema(String),
    /// `\quit`
    Quit,
}

/// Parses one command line. Returns `None` for anything unrecognized.
///
/// # Arguments
///
/// * `cmd` - Input line, starting with `\`.
pub fn parse_command(cmd: &str) -> Option<Commands> {
    let mut words = cmd.trim().trim_end_matches(';').split_whitespace();
    let head = words.next()?;
    let args: Vec<&str> = words.collect();
    match (head, args.as_slice()) {
        ("\\attach", [name, kind]) => Some(Commands::Attach {
            name: name.to_string(),
            kind: kind.to_string(),
            addr: None,
        }),
        ("\\attach", [name, kind, addr]) => Some(Commands::Attach {
            name: name.to_string(),
            kind: kind.to_string(),
            addr: Some(addr.to_string()),
        }),
        ("\\tables", []) | ("\\dt", []) => Some(Commands::Tables),
        ("\\schema", [name]) | ("\\d", [name]) => Some(Commands::Schema(name.to_string())),
        ("\\quit", []) | ("\\q", []) => Some(Commands::Quit),
        _ => None,
    }
}
