//! Interactive consultations at the terminal.
//!
//! By default lines are read with `rustyline`; piped input and builds
//! without the `repl-rustyline` feature read plain stdin.

use anyhow::{anyhow, bail, Result};
use colored::Colorize;
use inferent_engine::{Answer, ConsultationError, FactRequests, UserAgent, UserInput};
use inferent_kb::{Confidence, KnowledgeBase, Literal};
use std::io::{self, BufRead, Write};

// ============================================================================
// Input parsing
// ============================================================================

/// Parse `name=value[@confidence]` or `name value [confidence]`.
///
/// The value is parsed as the kind of the named fact; confidence defaults to 1.
pub fn parse_input(kb: &KnowledgeBase, text: &str) -> Result<UserInput> {
    let text = text.trim();
    let (name, value, confidence) = match text.split_once('=') {
        Some((name, rest)) => match rest.rsplit_once('@') {
            Some((value, confidence)) => (name.trim(), value, Some(confidence)),
            None => (name.trim(), rest, None),
        },
        None => {
            let mut tokens = text.split_whitespace();
            let name = tokens.next().ok_or_else(|| anyhow!("expected a fact name"))?;
            let value = tokens
                .next()
                .ok_or_else(|| anyhow!("expected a value for '{name}'"))?;
            let confidence = tokens.next();
            if tokens.next().is_some() {
                bail!("expected `name value [confidence]`");
            }
            (name, value, confidence)
        }
    };

    let kind = kb.facts.find(name)?.kind();
    let value = Literal::parse(kind, value)?;
    let confidence = match confidence {
        Some(text) => {
            let raw: f32 = text
                .trim()
                .parse()
                .map_err(|_| anyhow!("confidence '{}' is not a number", text.trim()))?;
            if !(0.0..=1.0).contains(&raw) {
                bail!("confidence {raw} is outside [0, 1]");
            }
            Confidence::new(raw)
        }
        None => Confidence::CERTAIN,
    };
    Ok(UserInput::new(name, value, confidence))
}

// ============================================================================
// Line sources
// ============================================================================

pub trait LineSource {
    /// `None` at end of input.
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>>;
}

pub struct PlainLines<R> {
    reader: R,
}

impl<R: BufRead> PlainLines<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> LineSource for PlainLines<R> {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        print!("{}", prompt.cyan().bold());
        io::stdout().flush()?;
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }
}

#[cfg(feature = "repl-rustyline")]
pub struct EditorLines {
    editor: rustyline::DefaultEditor,
}

#[cfg(feature = "repl-rustyline")]
impl EditorLines {
    pub fn new() -> Result<Self> {
        let editor =
            rustyline::DefaultEditor::new().map_err(|e| anyhow!("failed to init rustyline: {e}"))?;
        Ok(Self { editor })
    }
}

#[cfg(feature = "repl-rustyline")]
impl LineSource for EditorLines {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        use rustyline::error::ReadlineError;
        match self.editor.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    self.editor
                        .add_history_entry(line.as_str())
                        .map_err(|e| anyhow!("failed to record history: {e}"))?;
                }
                Ok(Some(line))
            }
            Err(ReadlineError::Eof | ReadlineError::Interrupted) => Ok(None),
            Err(e) => Err(anyhow!("readline error: {e}")),
        }
    }
}

/// The best line source for the current stdin.
pub fn terminal_lines() -> Result<Box<dyn LineSource>> {
    #[cfg(feature = "repl-rustyline")]
    {
        use std::io::IsTerminal;
        if io::stdin().is_terminal() {
            return Ok(Box::new(EditorLines::new()?));
        }
    }
    Ok(Box::new(PlainLines::new(io::stdin().lock())))
}

// ============================================================================
// Agent
// ============================================================================

enum Reply {
    Input(UserInput),
    Cancel,
    Blank,
}

/// A [`UserAgent`] that asks at the terminal.
pub struct TerminalAgent<'a> {
    lines: &'a mut dyn LineSource,
    given: Vec<UserInput>,
}

impl<'a> TerminalAgent<'a> {
    /// `given` values are passed on before the user is asked for more.
    pub fn new(lines: &'a mut dyn LineSource, given: Vec<UserInput>) -> Self {
        Self { lines, given }
    }

    fn read_reply(&mut self, kb: &KnowledgeBase, prompt: &str) -> Result<Reply> {
        loop {
            let Some(line) = self.lines.read_line(prompt)? else {
                return Ok(Reply::Cancel);
            };
            let line = line.trim();
            match line {
                "" => return Ok(Reply::Blank),
                "cancel" | "quit" | "exit" => return Ok(Reply::Cancel),
                _ => match parse_input(kb, line) {
                    Ok(input) => return Ok(Reply::Input(input)),
                    Err(e) => {
                        tracing::debug!(input = %line, error = %e, "unparsable answer");
                        eprintln!("{} {e}", "error:".red().bold());
                    }
                },
            }
        }
    }
}

impl UserAgent for TerminalAgent<'_> {
    fn initial_inputs(&mut self, kb: &KnowledgeBase) -> Result<Vec<UserInput>> {
        let mut inputs = std::mem::take(&mut self.given);
        println!(
            "Enter known facts as `name value [confidence]`; an empty line starts the consultation."
        );
        loop {
            match self.read_reply(kb, "known> ")? {
                Reply::Input(input) => inputs.push(input),
                Reply::Blank | Reply::Cancel => return Ok(inputs),
            }
        }
    }

    fn request(&mut self, kb: &KnowledgeBase, requests: &FactRequests) -> Result<Answer> {
        let names: Vec<&str> = requests.facts.iter().map(String::as_str).collect();
        println!("{} {}", "Need one of:".yellow().bold(), names.join(", "));
        for name in &names {
            if let Ok(fact) = kb.facts.find(name) {
                if !fact.description().is_empty() {
                    println!("  {name}: {}", fact.description().dimmed());
                }
            }
        }
        loop {
            match self.read_reply(kb, "answer> ")? {
                Reply::Input(input) => return Ok(Answer::Supply(input)),
                Reply::Cancel => return Ok(Answer::Cancel),
                Reply::Blank => println!("Type `name value [confidence]`, or `cancel`."),
            }
        }
    }

    fn rejected(&mut self, input: &UserInput, error: &ConsultationError) {
        tracing::debug!(fact = %input.fact, value = %input.value, %error, "answer rejected");
        eprintln!("{} {} ignored: {error}", "warning:".yellow().bold(), input.fact);
    }
}
