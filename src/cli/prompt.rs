// src/cli/prompt.rs
use anyhow::{Context, Result};
use std::io::{self, BufRead, Write};

/// Environment variable consulted before prompting for a password.
pub const ENV_PASSWORD: &str = "PNOTE_PASSWORD";

/// Anything starting with y/Y counts as yes; the default is no.
pub fn parse_confirmation(answer: &str) -> bool {
    matches!(answer.trim().chars().next(), Some('y' | 'Y'))
}

/// Ask a yes/no question on stderr and read the answer from stdin.
pub fn confirm(question: &str) -> Result<bool> {
    let answer = ask(&format!("{} [y/N] ", question))?;
    Ok(parse_confirmation(&answer))
}

/// Password from the flag, then the environment, then an interactive prompt.
pub fn resolve_password(flag: Option<String>) -> Result<String> {
    if let Some(password) = flag {
        return Ok(password);
    }
    if let Ok(password) = std::env::var(ENV_PASSWORD) {
        return Ok(password);
    }
    ask("Password: ")
}

fn ask(prompt: &str) -> Result<String> {
    let mut stderr = io::stderr();
    write!(stderr, "{}", prompt).context("Failed to write prompt")?;
    stderr.flush().context("Failed to flush prompt")?;

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read answer")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
