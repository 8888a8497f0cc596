use std::io::{self, BufRead, Write};

use is_terminal::IsTerminal;

/// Operator input used by the confirmation gate.
pub trait Prompter {
    /// True when an operator can answer prompts (stdin attached to a terminal).
    fn is_interactive(&self) -> bool;

    /// Read one line with echo. Only the trailing line ending is removed.
    /// # Errors
    /// `UnexpectedEof` when the input stream is closed.
    fn read_line(&self, prompt: &str) -> io::Result<String>;

    /// Read one line with echo suppressed.
    /// # Errors
    /// Returns an error when the terminal cannot be read.
    fn read_secret(&self, prompt: &str) -> io::Result<String>;
}

/// Strip a single trailing `\n` or `\r\n`; everything else (spaces included) is preserved.
#[must_use]
pub fn strip_line_ending(s: &str) -> &str {
    let s = s.strip_suffix('\n').unwrap_or(s);
    s.strip_suffix('\r').unwrap_or(s)
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn is_interactive(&self) -> bool {
        io::stdin().is_terminal()
    }

    fn read_line(&self, prompt: &str) -> io::Result<String> {
        let mut err = io::stderr();
        write!(err, "{prompt}")?;
        err.flush()?;
        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "input closed"));
        }
        Ok(strip_line_ending(&line).to_string())
    }

    fn read_secret(&self, prompt: &str) -> io::Result<String> {
        dialoguer::Password::new()
            .with_prompt(prompt)
            .allow_empty_password(true)
            .interact()
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))
    }
}
