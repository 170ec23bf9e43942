use std::io::{self, BufRead};

use rustyline::error::ReadlineError;
use rustyline::{config::Configurer, DefaultEditor};

use crate::error::ShellError;

pub enum ReadOutcome {
    Line(String),
    Interrupted,
    Eof,
}

enum Source {
    Editor(Box<DefaultEditor>),
    Plain(Box<dyn BufRead>),
}

/// Where command lines come from. A terminal gets a line editor and a
/// numbered prompt; anything else is read line by line with no prompt.
pub struct LineReader {
    source: Source,
    line_number: usize,
}

impl LineReader {
    pub fn new(interactive: bool) -> Result<Self, ShellError> {
        if interactive {
            let mut editor = DefaultEditor::new()?;
            editor.set_auto_add_history(true);
            Ok(Self::with_source(Source::Editor(Box::new(editor))))
        } else {
            Ok(Self::from_reader(io::BufReader::new(io::stdin())))
        }
    }

    pub fn from_reader(reader: impl BufRead + 'static) -> Self {
        Self::with_source(Source::Plain(Box::new(reader)))
    }

    fn with_source(source: Source) -> Self {
        Self {
            source,
            line_number: 0,
        }
    }

    pub fn prompt(&self) -> String {
        format!("{}: ", self.line_number)
    }

    pub fn line_number(&self) -> usize {
        self.line_number
    }

    pub fn read_line(&mut self) -> Result<ReadOutcome, ShellError> {
        let prompt = self.prompt();
        let outcome = match &mut self.source {
            Source::Editor(editor) => match editor.readline(&prompt) {
                Ok(line) => ReadOutcome::Line(line),
                Err(ReadlineError::Interrupted) => ReadOutcome::Interrupted,
                Err(ReadlineError::Eof) => ReadOutcome::Eof,
                Err(e) => return Err(e.into()),
            },
            // Byte-oriented so a stray non-UTF-8 line is still a line.
            Source::Plain(reader) => {
                let mut bytes = Vec::new();
                match reader.read_until(b'\n', &mut bytes)? {
                    0 => ReadOutcome::Eof,
                    _ => ReadOutcome::Line(String::from_utf8_lossy(&bytes).into_owned()),
                }
            }
        };

        if let ReadOutcome::Line(_) = outcome {
            self.line_number += 1;
        }
        Ok(outcome)
    }
}
