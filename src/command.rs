//! Command Orchestrator
//!
//! The deferred half of a quick-fix action: read the diagnostic text, resolve
//! the context span, request a fix, and apply it as one replacement edit.

use crate::config::FixSettings;
use crate::context::resolve_context_span;
use crate::host::{Document, Editor, Notifier, Span, SymbolOutline, Workbench};
use crate::openai::{request_fix, ChatClient, FixError};
use crate::provider::notify_missing_api_key;
use anyhow::Result;

/// Everything the fix command needs from its host.
pub struct FixDeps<'a> {
    pub settings: &'a FixSettings,
    pub client: &'a dyn ChatClient,
    pub outline: &'a dyn SymbolOutline,
    pub notifier: &'a dyn Notifier,
    pub workbench: &'a dyn Workbench,
}

const NO_FIX_MESSAGE: &str = "Sorry, GPT says it can't fix this problem automatically. \
Maybe try pasting more context into ChatGPT on the web?";

/// Run the full fix flow for the diagnostic at `range`.
///
/// Aborts without touching the document when the credential is missing, when
/// the request fails, or when the model has no usable fix; each of those is
/// reported through the notifier. A missing editor aborts silently. A failed
/// request is never applied as an empty replacement.
pub async fn run_fix_command(
    document: &dyn Document,
    range: &Span,
    deps: &FixDeps<'_>,
    editor: Option<&mut dyn Editor>,
) -> Result<()> {
    let problem = document.text_in_range(range);
    let context_span = resolve_context_span(document, deps.outline, range).await;
    let problem_code = document.text_in_range(&context_span);

    if deps.settings.missing_api_key() {
        notify_missing_api_key(deps.notifier, deps.workbench).await;
        return Ok(());
    }

    let fix = match request_fix(deps.client, deps.settings, &problem, &problem_code).await {
        Ok(fix) => fix,
        Err(FixError::NoUsableFix) => {
            deps.notifier.error(NO_FIX_MESSAGE, &[]).await;
            return Ok(());
        }
        Err(err) => {
            deps.notifier
                .error(
                    &format!("An error occurred trying to answer your question: {}", err),
                    &[],
                )
                .await;
            return Ok(());
        }
    };

    let Some(editor) = editor else {
        return Ok(());
    };

    editor.replace(&context_span, &fix);
    Ok(())
}

/// The host-exposed command behind the settings notification button.
pub fn open_settings_command(workbench: &dyn Workbench) {
    workbench.open_settings();
}
