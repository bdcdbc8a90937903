use std::fmt::Display;
use std::io::{BufRead, Write};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MenuError {
    #[error("nothing to choose from")]
    Empty,
    #[error("input closed before a choice was made")]
    Eof,
    #[error("{0:?} is not a number")]
    NotANumber(String),
    #[error("choice {choice} is out of range 1..={len}")]
    OutOfRange { choice: usize, len: usize },
    #[error("console io failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Prints `items` as a 1-based numbered list and reads one choice.
/// Returns the 0-based index.
pub fn choose<R, W, T>(
    input: &mut R,
    output: &mut W,
    heading: &str,
    items: &[T],
) -> Result<usize, MenuError>
where
    R: BufRead,
    W: Write,
    T: Display,
{
    if items.is_empty() {
        return Err(MenuError::Empty);
    }

    writeln!(output, "{heading}")?;
    for (idx, item) in items.iter().enumerate() {
        writeln!(output, "\t{}. {}", idx + 1, item)?;
    }
    write!(output, "Choose (Enter number): ")?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(MenuError::Eof);
    }
    parse_choice(line.trim(), items.len())
}

/// Validates a 1-based choice against a list of `len` items.
pub fn parse_choice(raw: &str, len: usize) -> Result<usize, MenuError> {
    let choice: usize = raw
        .parse()
        .map_err(|_| MenuError::NotANumber(raw.to_string()))?;
    check_choice(choice, len)
}

pub fn check_choice(choice: usize, len: usize) -> Result<usize, MenuError> {
    if choice == 0 || choice > len {
        return Err(MenuError::OutOfRange { choice, len });
    }
    Ok(choice - 1)
}
