//! Plumbing shared by the daily puzzle binaries.  Nothing in here
//! knows about any particular puzzle.

use std::io;
use std::io::prelude::*;

use tracing_subscriber::prelude::*;

/// Install a tracing subscriber which writes to stderr, so that
/// stdout carries only the answers.  `RUST_LOG` overrides
/// `default_directive`.
pub fn init_tracing(default_directive: &str) -> Result<(), String> {
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_writer(io::stderr);
    let filter_layer = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(default_directive))
        .map_err(|e| format!("bad log filter: {}", e))?;

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| format!("failed to install tracing subscriber: {}", e))
}

/// Read the whole puzzle input from stdin.
pub fn read_input() -> Result<String, String> {
    let mut input = String::new();
    match io::stdin().read_to_string(&mut input) {
        Ok(_) => Ok(input),
        Err(e) => Err(format!("failed to read input: {}", e)),
    }
}

/// Split the input into lines, dropping blank ones and any trailing
/// carriage returns.
pub fn nonblank_lines(input: &str) -> impl Iterator<Item = &str> {
    input
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.trim().is_empty())
}

#[test]
fn test_nonblank_lines() {
    let lines: Vec<&str> = nonblank_lines("a\r\n\nb\n  \nc").collect();
    assert_eq!(lines, vec!["a", "b", "c"]);
}
