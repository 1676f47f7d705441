//! In-memory line-indexed document, the stand-in for the host's document
//! model used by the CLI and the tests.

use crate::host::{Document, Position, Span};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

pub struct TextDocument {
    lines: Vec<String>,
}

impl TextDocument {
    pub fn new(text: &str) -> Self {
        Self {
            lines: text.split('\n').map(str::to_string).collect(),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Ok(Self::new(&text))
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        fs::write(path, self.text())
            .with_context(|| format!("Failed to write {}", path.display()))
    }

    /// Replace the text covered by `span` with `text`, as one atomic splice.
    pub fn replace_span(&mut self, span: &Span, text: &str) {
        let (start, end) = self.clip_span(span);
        let prefix = self.lines[start.line][..start.character].to_string();
        let suffix = self.lines[end.line][end.character..].to_string();

        let mut replacement: Vec<String> = text.split('\n').map(str::to_string).collect();
        // Splice the surviving line fragments onto the replacement edges.
        if let Some(first) = replacement.first_mut() {
            *first = format!("{}{}", prefix, first);
        }
        if let Some(last) = replacement.last_mut() {
            last.push_str(&suffix);
        }

        self.lines.splice(start.line..=end.line, replacement);
    }

    fn clip_position(&self, position: Position) -> Position {
        let line = position.line.min(self.lines.len() - 1);
        let text = &self.lines[line];
        let mut character = if position.line > line {
            text.len()
        } else {
            position.character.min(text.len())
        };
        // Hosts report character offsets; an offset landing inside a
        // multibyte character snaps back to its start.
        while !text.is_char_boundary(character) {
            character -= 1;
        }
        Position::new(line, character)
    }

    fn clip_span(&self, span: &Span) -> (Position, Position) {
        (self.clip_position(span.start), self.clip_position(span.end))
    }
}

impl Document for TextDocument {
    fn line_count(&self) -> usize {
        self.lines.len()
    }

    fn text(&self) -> String {
        self.lines.join("\n")
    }

    fn text_in_range(&self, span: &Span) -> String {
        let (start, end) = self.clip_span(span);
        if start.line == end.line {
            return self.lines[start.line][start.character..end.character].to_string();
        }

        let mut parts = vec![self.lines[start.line][start.character..].to_string()];
        for line in &self.lines[start.line + 1..end.line] {
            parts.push(line.clone());
        }
        parts.push(self.lines[end.line][..end.character].to_string());
        parts.join("\n")
    }

    fn line_end(&self, line: usize) -> Position {
        let line = line.min(self.lines.len() - 1);
        Position::new(line, self.lines[line].len())
    }
}
