//! Shell completion script generation.

use std::io;

use clap::Command;
use clap_complete::{Shell, generate};

/// Write a completion script for `shell` to stdout.
pub fn generate_completions(shell: Shell, cmd: &mut Command) {
    let name = cmd.get_name().to_string();
    generate(shell, cmd, name, &mut io::stdout());
}
