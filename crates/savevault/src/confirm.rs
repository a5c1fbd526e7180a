//! Yes/no confirmation before destructive actions

use std::{
    fmt::Display,
    io::{BufRead, Write},
};

/// A question put to the user before an action overwrites or deletes data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prompt<'a> {
    Load { name: &'a str },
    Remove { name: &'a str },
}

impl Prompt<'_> {
    pub fn title(&self) -> &'static str {
        match self {
            Prompt::Load { .. } => "Load",
            Prompt::Remove { .. } => "Remove",
        }
    }
}

impl Display for Prompt<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Prompt::Load { name } => {
                write!(f, "Do you really want to load the save?\n\"{name}\"")
            }
            Prompt::Remove { name } => {
                write!(f, "Do you really want to remove the save?\n\"{name}\"")
            }
        }
    }
}

/// Line-oriented input. Implemented for every [`BufRead`] and for
/// [`StdinLines`], which takes the stdin lock only for the duration of each
/// read so the shell and its prompts can share the terminal.
pub trait ReadLine {
    fn read_line(&mut self, buf: &mut String) -> std::io::Result<usize>;
}

impl<R: BufRead> ReadLine for R {
    fn read_line(&mut self, buf: &mut String) -> std::io::Result<usize> {
        BufRead::read_line(self, buf)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct StdinLines;

impl ReadLine for StdinLines {
    fn read_line(&mut self, buf: &mut String) -> std::io::Result<usize> {
        std::io::stdin().read_line(buf)
    }
}

/// Something that can answer a [`Prompt`]
pub trait Confirm {
    fn confirm(&mut self, prompt: &Prompt<'_>) -> std::io::Result<bool>;
}

/// Answers yes without asking.
#[derive(Debug, Default)]
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&mut self, prompt: &Prompt<'_>) -> std::io::Result<bool> {
        tracing::debug!(title = prompt.title(), "confirmation assumed");
        Ok(true)
    }
}

/// Asks on a terminal. Anything but `y` or `yes` counts as no, including end
/// of input.
pub struct TerminalConfirm<R, W> {
    input: R,
    output: W,
}

impl TerminalConfirm<StdinLines, std::io::Stderr> {
    pub fn stdio() -> Self {
        Self::new(StdinLines, std::io::stderr())
    }
}

impl<R: ReadLine, W: Write> TerminalConfirm<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: ReadLine, W: Write> Confirm for TerminalConfirm<R, W> {
    fn confirm(&mut self, prompt: &Prompt<'_>) -> std::io::Result<bool> {
        write!(self.output, "[{}] {prompt}\n[y/N] ", prompt.title())?;
        self.output.flush()?;

        let mut line = String::new();
        self.input.read_line(&mut line)?;

        Ok(is_yes(&line))
    }
}

fn is_yes(answer: &str) -> bool {
    let answer = answer.trim().to_ascii_lowercase();
    answer == "y" || answer == "yes"
}

impl<C: Confirm + ?Sized> Confirm for Box<C> {
    fn confirm(&mut self, prompt: &Prompt<'_>) -> std::io::Result<bool> {
        (**self).confirm(prompt)
    }
}
