//! Interactive shell for the simulation kernel.
//!
//! Reads a line, parses it against the command grammar, dispatches onto the
//! world, and prints the result. Parse and precondition errors print a
//! single `Error:` line and leave the world untouched.

mod commands;
mod parser;

use anyhow::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing_subscriber::EnvFilter;

use agora_core::World;
use commands::Outcome;

fn main() -> Result<()> {
    // Kernel tracing stays quiet unless RUST_LOG asks for it.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("off"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut world = World::standard();
    let mut editor = DefaultEditor::new()?;

    println!("agora - a small closed economy. Type 'help' for commands.");

    loop {
        match editor.readline("agora> ") {
            Ok(line) => {
                let _ = editor.add_history_entry(line.as_str());
                let input = match parser::parse(&line) {
                    Ok(input) => input,
                    Err(e) => {
                        println!("Error: {e}");
                        continue;
                    }
                };
                match commands::dispatch(&mut world, input) {
                    Ok(Outcome::Continue) => {}
                    Ok(Outcome::Exit) => break,
                    Err(e) => println!("Error: {e}"),
                }
            }
            // Ctrl-C / Ctrl-D cut the loop; a tick either completed or the
            // process exits.
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        }
    }

    Ok(())
}
