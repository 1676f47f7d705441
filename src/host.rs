//! Host Capability Surface
//!
//! The editor host owns the document model, the diagnostics pipeline, the
//! symbol outline and the notification UI. Everything this crate needs from
//! it is expressed as a small set of traits so the fix flow can be driven by
//! a real editor integration, the headless CLI, or a test double alike.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A zero-based line/character position in a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Position {
    pub line: usize,
    pub character: usize,
}

impl Position {
    pub fn new(line: usize, character: usize) -> Self {
        Self { line, character }
    }
}

/// A position span inside a document, end inclusive for containment checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, position: Position) -> bool {
        self.start <= position && position <= self.end
    }
}

/// A host-reported issue attached to a document range. Read-only here; the
/// diagnostics engine that produces these lives entirely in the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub message: String,
    pub range: Span,
}

impl Diagnostic {
    pub fn new(message: impl Into<String>, range: Span) -> Self {
        Self {
            message: message.into(),
            range,
        }
    }
}

/// One node of the host's symbol outline (function, method, class...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocSymbol {
    pub name: String,
    pub range: Span,
    #[serde(default)]
    pub children: Vec<DocSymbol>,
}

impl DocSymbol {
    pub fn new(name: impl Into<String>, range: Span) -> Self {
        Self {
            name: name.into(),
            range,
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<DocSymbol>) -> Self {
        self.children = children;
        self
    }
}

/// A deferred command invocation carried by a code action. The invocation
/// arguments are the target document's identifier (a URI for editor hosts, a
/// path for the CLI) and the diagnostic's range, so a host juggling several
/// documents can dispatch unambiguously.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    pub title: String,
    pub command: String,
    pub document: String,
    pub range: Span,
}

/// A user-selectable quick fix offered at a diagnostic's location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeAction {
    pub title: String,
    pub command: Command,
}

/// Read access to a document's text.
pub trait Document {
    fn line_count(&self) -> usize;

    /// Full document text.
    fn text(&self) -> String;

    /// Text covered by `span`, clipped to the document bounds.
    fn text_in_range(&self, span: &Span) -> String;

    /// Position of the last character of `line`, clipped to the last line.
    fn line_end(&self, line: usize) -> Position;
}

/// The host's symbol-outline query. `None` means the host has no outline for
/// the document (no language support, provider not ready, ...).
#[async_trait]
pub trait SymbolOutline: Send + Sync {
    async fn document_symbols(&self) -> Option<Vec<DocSymbol>>;
}

/// User-facing error notifications with optional action buttons. Returns the
/// title of the button the user picked, if any.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn error(&self, message: &str, actions: &[&str]) -> Option<String>;
}

/// Host UI affordances outside any single document.
pub trait Workbench: Send + Sync {
    fn open_settings(&self);
}

/// Text replacement on the active editor. The orchestrator receives this as
/// an `Option`: no active editor means the fix is silently dropped.
pub trait Editor {
    fn replace(&mut self, span: &Span, text: &str);
}
