//! Context-Range Resolution
//!
//! Picks the code span sent to the model alongside a diagnostic: the
//! innermost enclosing symbol when the host outline has one, otherwise the
//! diagnostic's own range widened by a fixed line margin.

use crate::host::{DocSymbol, Document, Position, Span, SymbolOutline};

/// Fixed widening applied when no enclosing symbol is found.
pub const CONTEXT_MARGIN_LINES: usize = 10;

/// Innermost symbol span containing `position`. Depth-first: a node's
/// children are searched before its own span is tested, so the tightest
/// enclosing function or method wins over its parent.
pub fn enclosing_symbol_span(symbols: &[DocSymbol], position: Position) -> Option<Span> {
    for symbol in symbols {
        if !symbol.children.is_empty() {
            if let Some(found) = enclosing_symbol_span(&symbol.children, position) {
                return Some(found);
            }
        }

        if symbol.range.contains(position) {
            return Some(symbol.range);
        }
    }

    None
}

/// Widen `span` by `margin` lines on each side, clipped to the document.
/// The widened span runs from column 0 of the first included line to the end
/// of the last included line.
pub fn extend_span(document: &dyn Document, span: &Span, margin: usize) -> Span {
    let start_line = span.start.line.saturating_sub(margin);
    let last_line = document.line_count().saturating_sub(1);
    let end_line = (span.end.line + margin).min(last_line);
    Span::new(Position::new(start_line, 0), document.line_end(end_line))
}

/// The span to send as context for a diagnostic starting at
/// `diagnostic.start`: enclosing-symbol result when available, fixed
/// expansion as the sole fallback.
pub async fn resolve_context_span(
    document: &dyn Document,
    outline: &dyn SymbolOutline,
    diagnostic: &Span,
) -> Span {
    if let Some(symbols) = outline.document_symbols().await {
        if let Some(span) = enclosing_symbol_span(&symbols, diagnostic.start) {
            return span;
        }
    }

    extend_span(document, diagnostic, CONTEXT_MARGIN_LINES)
}
