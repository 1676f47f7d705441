use aiquickfix::command::{run_fix_command, FixDeps};
use aiquickfix::config::FixSettings;
use aiquickfix::document::TextDocument;
use aiquickfix::host::Document as _;
use aiquickfix::host::{DocSymbol, Editor, Notifier, Position, Span, SymbolOutline, Workbench};
use aiquickfix::openai::OpenAiClient;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use colored::*;
use std::env;
use std::path::{Path, PathBuf};

/// Notifications land on stderr in a headless run; there are no buttons to
/// click, so no action is ever selected.
struct TerminalNotifier;

#[async_trait]
impl Notifier for TerminalNotifier {
    async fn error(&self, message: &str, _actions: &[&str]) -> Option<String> {
        eprintln!("{} {}", "⚠️".red(), message);
        None
    }
}

struct TerminalWorkbench {
    settings_path: PathBuf,
}

impl Workbench for TerminalWorkbench {
    fn open_settings(&self) {
        println!(
            "{} Edit your settings at {}",
            "⚙️".cyan(),
            self.settings_path.display()
        );
    }
}

/// No symbol provider exists outside an editor, so the fix flow always takes
/// the fixed-expansion fallback here.
struct NoOutline;

#[async_trait]
impl SymbolOutline for NoOutline {
    async fn document_symbols(&self) -> Option<Vec<DocSymbol>> {
        None
    }
}

struct FileEditor<'a> {
    document: &'a mut TextDocument,
}

impl Editor for FileEditor<'_> {
    fn replace(&mut self, span: &Span, text: &str) {
        self.document.replace_span(span, text);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args: Vec<String> = env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("init") => init_settings(),
        Some("fix") if args.len() >= 4 => {
            let line: usize = args[2]
                .parse()
                .context("Line must be a 1-based line number")?;
            run_fix(Path::new(&args[1]), line, &args[3..].join(" ")).await
        }
        _ => {
            println!("Usage:");
            println!("  aiquickfix init                       Write a default settings file");
            println!("  aiquickfix fix <file> <line> <msg>    Fix the problem <msg> reported on <line>");
            Ok(())
        }
    }
}

fn settings_path() -> Result<PathBuf> {
    FixSettings::default_path().ok_or_else(|| anyhow!("No user config directory available"))
}

fn init_settings() -> Result<()> {
    let path = settings_path()?;
    if path.exists() {
        println!("{} Settings already exist at {}", "✅".green(), path.display());
        return Ok(());
    }
    FixSettings::default().save_to(&path)?;
    println!("{} Wrote default settings to {}", "⚙️".green(), path.display());
    println!("   Set your OpenAI API key there, or export OPENAI_API_KEY.");
    Ok(())
}

fn load_settings() -> Result<FixSettings> {
    let path = settings_path()?;
    let mut settings = if path.exists() {
        FixSettings::load_from(&path)?
    } else {
        FixSettings::default()
    };

    // .env / environment credential wins over an empty settings file.
    if settings.missing_api_key() {
        if let Ok(key) = env::var("OPENAI_API_KEY") {
            settings.api_key = key;
        }
    }
    Ok(settings)
}

async fn run_fix(file: &Path, line: usize, message: &str) -> Result<()> {
    let line_index = line
        .checked_sub(1)
        .ok_or_else(|| anyhow!("Line numbers are 1-based"))?;

    let mut document = TextDocument::from_file(file)?;
    if line_index >= document.line_count() {
        return Err(anyhow!(
            "{} has only {} lines",
            file.display(),
            document.line_count()
        ));
    }

    let settings = load_settings()?;
    let range = Span::new(
        Position::new(line_index, 0),
        document.line_end(line_index),
    );

    println!(
        "{} Requesting fix for {}:{} \"{}\" ({})",
        "🔧".cyan(),
        file.display(),
        line,
        message,
        settings.model.bold()
    );

    let client = OpenAiClient::new();
    let notifier = TerminalNotifier;
    let workbench = TerminalWorkbench {
        settings_path: settings_path()?,
    };
    let deps = FixDeps {
        settings: &settings,
        client: &client,
        outline: &NoOutline,
        notifier: &notifier,
        workbench: &workbench,
    };

    let before = document.text();
    {
        let snapshot = TextDocument::new(&before);
        let mut editor = FileEditor {
            document: &mut document,
        };
        run_fix_command(&snapshot, &range, &deps, Some(&mut editor)).await?;
    }

    if document.text() == before {
        println!("{} No fix applied.", "📭".yellow());
        return Ok(());
    }

    document.save_to(file)?;
    println!("{} Applied fix and saved {}", "✨".green(), file.display());
    Ok(())
}
