//! `tree-patch` — apply patch command tuples to a document.
//!
//! Usage:
//!   tree-patch '<commands-json>'
//!
//! The document is read from stdin. The commands are the first argument:
//! one `[op, path, ...args]` tuple or an array of them.

use std::io::{self, Read, Write};
use treepatch::cli::apply_command_tuples;

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let commands = match args.get(1) {
        Some(c) => c.clone(),
        None => {
            eprintln!("First argument must be a JSON command tuple or array of tuples.");
            std::process::exit(1);
        }
    };

    let mut buf = String::new();
    if let Err(e) = io::stdin().read_to_string(&mut buf) {
        eprintln!("{e}");
        std::process::exit(1);
    }

    match apply_command_tuples(buf.trim(), &commands) {
        Ok(result) => {
            io::stdout().write_all(result.as_bytes()).unwrap();
            io::stdout().write_all(b"\n").unwrap();
        }
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}
