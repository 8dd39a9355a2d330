//! Line-based prompts and colored output over any reader/writer pair.

use colored::Colorize;
use std::fmt::Display;
use std::io::{self, BufRead, Write};

/// Errors from console interaction.
#[derive(Debug, thiserror::Error)]
pub enum ConsoleError {
    /// The input stream ended (Ctrl-D or end of a piped script).
    #[error("input closed")]
    Closed,
    #[error("console I/O failed: {0}")]
    Io(#[from] io::Error),
}

/// A prompt-and-print wrapper around an input and an output stream.
pub struct Console<R, W> {
    input: R,
    output: W,
}

impl Console<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Prompt once and return the trimmed line, which may be empty.
    pub fn take_input(&mut self, msg: &str) -> Result<String, ConsoleError> {
        write!(self.output, "{}", msg.bright_green())?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(ConsoleError::Closed);
        }
        Ok(line.trim().to_string())
    }

    /// Prompt until a non-empty line is entered.
    pub fn non_empty_input(&mut self, msg: &str) -> Result<String, ConsoleError> {
        loop {
            let line = self.take_input(msg)?;
            if !line.is_empty() {
                return Ok(line);
            }
        }
    }

    /// Prompt until one of `choices` is entered (case-insensitive). Returns it lowercased.
    pub fn input_from(&mut self, msg: &str, choices: &[&str]) -> Result<String, ConsoleError> {
        loop {
            let line = self.non_empty_input(msg)?.to_lowercase();
            if choices.iter().any(|c| c.eq_ignore_ascii_case(&line)) {
                return Ok(line);
            }
            self.red(format!("Warning: Input from {}", choices.join(", ")))?;
        }
    }

    /// Prompt until an integer in `[low, high)` is entered.
    pub fn input_in_range(
        &mut self,
        msg: &str,
        low: usize,
        high: usize,
    ) -> Result<usize, ConsoleError> {
        loop {
            let line = self.non_empty_input(msg)?;
            match line.parse::<usize>() {
                Ok(n) if (low..high).contains(&n) => return Ok(n),
                Ok(_) => self.red(format!("Warning: Input range is [{low},{high})"))?,
                Err(_) => self.red("Warning: Please input a number")?,
            }
        }
    }

    pub fn red(&mut self, text: impl Display) -> io::Result<()> {
        writeln!(self.output, "{}", text.to_string().bright_red())
    }

    pub fn green(&mut self, text: impl Display) -> io::Result<()> {
        writeln!(self.output, "{}", text.to_string().bright_green())
    }

    pub fn yellow(&mut self, text: impl Display) -> io::Result<()> {
        writeln!(self.output, "{}", text.to_string().bright_yellow())
    }

    pub fn cyan(&mut self, text: impl Display) -> io::Result<()> {
        writeln!(self.output, "{}", text.to_string().bright_cyan())
    }

    pub fn grey(&mut self, text: impl Display) -> io::Result<()> {
        writeln!(self.output, "{}", text.to_string().bright_black())
    }

    /// A blue label followed by a cyan value on one line.
    pub fn field(&mut self, label: &str, value: impl Display) -> io::Result<()> {
        writeln!(
            self.output,
            "{} {}",
            format!("{label}:").bright_blue(),
            value.to_string().bright_cyan()
        )
    }

    /// Bold blue title underlined with dashes.
    pub fn heading(&mut self, title: &str) -> io::Result<()> {
        writeln!(self.output)?;
        writeln!(self.output, "{}", title.bright_blue().bold())?;
        writeln!(
            self.output,
            "{}",
            "-".repeat(title.chars().count()).bright_blue().bold()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn console(input: &str) -> Console<Cursor<Vec<u8>>, Vec<u8>> {
        colored::control::set_override(false);
        Console::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    fn output(c: Console<Cursor<Vec<u8>>, Vec<u8>>) -> String {
        String::from_utf8(c.into_output()).unwrap()
    }

    #[test]
    fn test_non_empty_input_skips_blank_lines() {
        let mut c = console("\n  \nAda\n");
        assert_eq!(c.non_empty_input("> ").unwrap(), "Ada");
    }

    #[test]
    fn test_input_from_reprompts() {
        let mut c = console("x\nF\n");
        assert_eq!(c.input_from("gender: ", &["m", "f"]).unwrap(), "f");
        assert!(output(c).contains("Warning: Input from m, f"));
    }

    #[test]
    fn test_input_in_range() {
        let mut c = console("abc\n0\n5\n2\n");
        assert_eq!(c.input_in_range("pick: ", 1, 3).unwrap(), 2);
        let out = output(c);
        assert!(out.contains("Please input a number"));
        assert!(out.contains("Input range is [1,3)"));
    }

    #[test]
    fn test_closed_input() {
        let mut c = console("");
        assert!(matches!(c.take_input("> "), Err(ConsoleError::Closed)));
    }

    #[test]
    fn test_heading_underline() {
        let mut c = console("");
        c.heading("SHOW").unwrap();
        assert_eq!(output(c), "\nSHOW\n----\n");
    }
}
