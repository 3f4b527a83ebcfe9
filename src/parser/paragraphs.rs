use std::borrow::Cow;

use super::rules::Tag;

/// Pseudo-paragraph boundary used inside `Description` blocks.
pub const DELIMITER: &str = "||";

/// One token of the delimiter split, with its look-ahead already resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token<'a> {
    /// Nothing but whitespace between two delimiters (or at an edge).
    Gap,
    /// Trimmed text; `closes` when the text runs straight into the next
    /// delimiter or is the final fragment.
    Text { text: &'a str, closes: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Buffering,
    /// The last text token ended a paragraph; it is emitted before the next
    /// token is consumed.
    BoundaryPending,
}

struct Machine {
    state: State,
    buffer: String,
    paragraphs: Vec<String>,
}

impl Machine {
    fn new() -> Self {
        Machine {
            state: State::Buffering,
            buffer: String::new(),
            paragraphs: Vec::new(),
        }
    }

    fn step(&mut self, token: Token<'_>) {
        if self.state == State::BoundaryPending {
            self.flush();
            self.state = State::Buffering;
        }
        match token {
            Token::Gap => {}
            Token::Text { text, closes } => {
                if !self.buffer.is_empty() {
                    self.buffer.push(' ');
                }
                self.buffer.push_str(text);
                if closes {
                    self.state = State::BoundaryPending;
                }
            }
        }
    }

    fn flush(&mut self) {
        if !self.buffer.is_empty() {
            self.paragraphs.push(std::mem::take(&mut self.buffer));
        }
    }

    /// Anything still buffered (a trailing loose delimiter) becomes the last
    /// paragraph rather than being dropped.
    fn finish(mut self) -> Vec<String> {
        self.flush();
        self.paragraphs
    }
}

fn tokens(blob: &str) -> impl Iterator<Item = Token<'_>> {
    let mut parts = blob.split(DELIMITER).peekable();
    std::iter::from_fn(move || {
        let raw = parts.next()?;
        let text = raw.trim();
        if text.is_empty() {
            return Some(Token::Gap);
        }
        let is_last = parts.peek().is_none();
        let tight = raw.trim_end().len() == raw.len();
        Some(Token::Text {
            text,
            closes: is_last || tight,
        })
    })
}

/// Split a `||`-delimited blob into trimmed, non-empty paragraphs.
///
/// A paragraph only closes where its last fragment is immediately followed by
/// the delimiter (`a||b`) or at the end of input; a delimiter preceded by
/// whitespace (`a ||b`) continues the paragraph, and empty fragments are
/// skipped without closing anything.
pub fn paragraphs(blob: &str) -> Vec<String> {
    let mut machine = Machine::new();
    for token in tokens(blob) {
        machine.step(token);
    }
    machine.finish()
}

pub fn wrap(paragraphs: &[String]) -> String {
    paragraphs.iter().map(|p| format!("<p>{}</p>", p)).collect()
}

fn is_wrapped(text: &str) -> bool {
    text.starts_with("<p>") || text.starts_with("<p ")
}

/// Paragraph-wrapped form of a description. Text that already starts with a
/// paragraph container and has no delimiter left is returned trimmed, so
/// repeated runs are stable.
pub fn reconstruct(description: &str) -> Cow<'_, str> {
    let trimmed = description.trim();
    if is_wrapped(trimmed) && !trimmed.contains(DELIMITER) {
        Cow::Borrowed(trimmed)
    } else {
        Cow::Owned(wrap(&paragraphs(trimmed)))
    }
}

/// Rewrite every `Description` block of a markup document with its
/// reconstructed content; everything outside those blocks is left as is.
pub fn rewrite_descriptions(markup: &str) -> Cow<'_, str> {
    Tag::Description.pattern().replace_all(markup, |caps: &regex::Captures| {
        let inner = caps.get(1).map_or("", |m| m.as_str());
        format!("<Description>\n{}\n</Description>", reconstruct(inner))
    })
}
