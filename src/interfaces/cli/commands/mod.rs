//! CLI command implementations
//!
//! This module re-exports all CLI command functions.

mod bulk;
mod config_gen;
mod currency;

pub use bulk::*;
pub use config_gen::*;
pub use currency::*;

use std::io::{self, BufRead, Write};

/// Print `question` and read one line; only "y" counts as yes.
fn read_yes_no(question: &str, input: &mut impl BufRead, output: &mut impl Write) -> io::Result<bool> {
    write!(output, "{}", question)?;
    output.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(answer.trim().eq_ignore_ascii_case("y"))
}

/// Terminal y/N prompt; stdin blocks, so it runs on the blocking pool.
async fn ask_on_terminal(question: String) -> io::Result<bool> {
    tokio::task::spawn_blocking(move || {
        read_yes_no(&question, &mut io::stdin().lock(), &mut io::stdout())
    })
    .await
    .map_err(io::Error::other)?
}
