//! Quick-fix action provider: one selectable action per diagnostic, each
//! deferring to the fix command with the diagnostic's range.

use crate::config::FixSettings;
use crate::host::{CodeAction, Command, Diagnostic, Notifier, Workbench};

/// Command id the host dispatches to run the full fix flow.
pub const FIX_COMMAND: &str = "aiquickfix.fix";

/// Command id that opens this extension's settings page.
pub const OPEN_SETTINGS_COMMAND: &str = "aiquickfix.openSettings";

pub const OPEN_SETTINGS_ACTION: &str = "Open Settings";

const MISSING_KEY_MESSAGE: &str = "Please set your OpenAI API key in the settings";

/// Tell the user the credential is missing, with an Open Settings button.
pub async fn notify_missing_api_key(notifier: &dyn Notifier, workbench: &dyn Workbench) {
    let selection = notifier
        .error(MISSING_KEY_MESSAGE, &[OPEN_SETTINGS_ACTION])
        .await;
    if selection.as_deref() == Some(OPEN_SETTINGS_ACTION) {
        workbench.open_settings();
    }
}

/// Build the quick-fix actions for the diagnostics the host found at a range.
///
/// No diagnostics means no actions and no side effects. A missing credential
/// also yields no actions, but the user is told once via the notifier.
pub async fn provide_code_actions(
    document_uri: &str,
    diagnostics: &[Diagnostic],
    settings: &FixSettings,
    notifier: &dyn Notifier,
    workbench: &dyn Workbench,
) -> Vec<CodeAction> {
    if diagnostics.is_empty() {
        return Vec::new();
    }

    if settings.missing_api_key() {
        notify_missing_api_key(notifier, workbench).await;
        return Vec::new();
    }

    diagnostics
        .iter()
        .map(|diagnostic| CodeAction {
            title: format!("AI QuickFix: \"{}\"", diagnostic.message),
            command: Command {
                title: "Request Fix using OpenAI API".to_string(),
                command: FIX_COMMAND.to_string(),
                document: document_uri.to_string(),
                range: diagnostic.range,
            },
        })
        .collect()
}
