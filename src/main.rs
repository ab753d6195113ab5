use anyhow::{bail, Context, Result};
use clap::Parser;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::prelude::*;

use portfolio_shell::config::Config;
use portfolio_shell::history::MemoryHistory;
use portfolio_shell::navigation::HistoryChange;
use portfolio_shell::registry::StaticPageRegistry;
use portfolio_shell::shell::Shell;
use portfolio_shell::state::{FileSessionStore, TabSnapshot};

const VERSION: &str = env!("PORTFOLIO_SHELL_BUILD_VERSION");

/// portfolio-shell: IDE-style tab shell of a portfolio site
#[derive(Parser, Debug)]
#[command(
    version = VERSION,
    about,
    long_about = "portfolio-shell: IDE-style tab shell of a portfolio site\n\n\
        Replays tab actions against a file-backed session store and prints\n\
        the resulting tab set as JSON. Running it again with the same\n\
        session file behaves like a page reload.",
    after_long_help = "Actions:\n\
        \x20 open:<path>              Navigate to a page (pushes history)\n\
        \x20 close:<id>               Close a tab\n\
        \x20 activate:<id>            Activate a tab\n\
        \x20 move:<id>:<index>        Move a tab within the tab strip\n\
        \x20 back / forward           Host history navigation\n\
        \x20 close-others:<id>        Close every tab except one\n\
        \x20 close-all                Close every tab\n\n\
        Examples:\n\
        \x20 portfolio-shell open:/about open:/projects\n\
        \x20 portfolio-shell --location /ide/about move:about:0 back"
)]
struct Cli {
    /// Config file (defaults to config.json in the platform config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Session store file (defaults to the platform data directory)
    #[arg(long)]
    session: Option<PathBuf>,

    /// Browser location at startup
    #[arg(long, default_value = "/ide")]
    location: String,

    /// JSON file mapping logical paths to content provider ids
    #[arg(long)]
    pages: Option<PathBuf>,

    /// Actions to replay, in order
    #[arg(value_parser = parse_action)]
    actions: Vec<Action>,
}

#[derive(Debug, Clone, PartialEq)]
enum Action {
    Open(String),
    Close(String),
    Activate(String),
    Move(String, usize),
    Back,
    Forward,
    CloseOthers(String),
    CloseAll,
}

fn parse_action(value: &str) -> Result<Action, String> {
    let (verb, argument) = match value.split_once(':') {
        Some((verb, argument)) => (verb, Some(argument)),
        None => (value, None),
    };
    let required = |name: &str| {
        argument
            .filter(|argument| !argument.is_empty())
            .map(str::to_string)
            .ok_or_else(|| format!("`{verb}` needs a {name}, e.g. `{verb}:<{name}>`"))
    };

    match verb {
        "open" => Ok(Action::Open(argument.unwrap_or_default().to_string())),
        "close" => required("id").map(Action::Close),
        "activate" => required("id").map(Action::Activate),
        "close-others" => required("id").map(Action::CloseOthers),
        "move" => {
            let target = required("id:index")?;
            let (id, index) = target
                .rsplit_once(':')
                .ok_or_else(|| "`move` needs `move:<id>:<index>`".to_string())?;
            let index = index
                .parse()
                .map_err(|e| format!("invalid index `{index}`: {e}"))?;
            Ok(Action::Move(id.to_string(), index))
        }
        "back" => Ok(Action::Back),
        "forward" => Ok(Action::Forward),
        "close-all" => Ok(Action::CloseAll),
        _ => Err(format!("unknown action `{value}`")),
    }
}

const DEFAULT_LOGLEVEL: &str = if cfg!(debug_assertions) {
    "debug"
} else {
    "info"
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before any other initialization)
    let cli = Cli::parse();

    // Load environment variables from .env file
    if let Ok(dotenv) = dotenvy::dotenv() {
        eprintln!("Loaded .env file from: {}", dotenv.display());
    }
    init_tracing();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load(),
    };
    let registry = match &cli.pages {
        Some(path) => load_pages(path)?,
        None => StaticPageRegistry::portfolio_seed(),
    };
    let session_path = cli
        .session
        .clone()
        .unwrap_or_else(FileSessionStore::default_path);
    tracing::debug!(session = %session_path.display(), pages = registry.len(), "Starting shell");

    let history = MemoryHistory::new(cli.location.as_str());
    let mut shell = Shell::new(
        config,
        Arc::new(registry),
        Box::new(history.clone()),
        Arc::new(FileSessionStore::new(session_path)),
    );
    if let Some(outcome) = shell.mount_after_grace().await {
        tracing::debug!(?outcome, "Mounted");
    }

    for action in cli.actions {
        apply(&mut shell, &history, action)?;
    }

    let snapshot = shell
        .manager()
        .root_group()
        .map(TabSnapshot::from)
        .unwrap_or_default();
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}

fn apply(shell: &mut Shell, history: &MemoryHistory, action: Action) -> Result<()> {
    tracing::debug!(?action, "Applying action");
    match action {
        Action::Open(path) => {
            if !shell.navigate(&path) {
                tracing::warn!(%path, "No page registered for path");
            }
        }
        Action::Close(id) => shell.manager_mut().close_tab(&id),
        Action::Activate(id) => {
            if !shell.manager_mut().set_active_tab(&id, true) {
                bail!("No open tab with id `{id}`");
            }
        }
        Action::Move(id, index) => {
            let group_id = shell.manager().root_group_id().to_string();
            if !shell.manager_mut().move_tab(&id, &group_id, &group_id, index) {
                bail!("No open tab with id `{id}`");
            }
        }
        Action::Back => match history.back() {
            Some(pathname) => shell.on_history_change(&HistoryChange::new(pathname)),
            None => tracing::warn!("Already at the oldest history entry"),
        },
        Action::Forward => match history.forward() {
            Some(pathname) => shell.on_history_change(&HistoryChange::new(pathname)),
            None => tracing::warn!("Already at the newest history entry"),
        },
        Action::CloseOthers(id) => shell.manager_mut().close_other_tabs(&id),
        Action::CloseAll => shell.manager_mut().close_all_tabs(),
    }
    Ok(())
}

fn load_pages(path: &Path) -> Result<StaticPageRegistry> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read pages file {}", path.display()))?;
    let pages: HashMap<String, String> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse pages file {}", path.display()))?;
    Ok(StaticPageRegistry::from_providers(pages))
}

fn init_tracing() {
    let env_filter_layer =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOGLEVEL));

    // stdout carries the JSON result, so logs go to stderr
    let fmt_layer = tracing_subscriber::fmt::layer()
        .pretty()
        .without_time()
        .with_target(false)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(env_filter_layer)
        .with(fmt_layer)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_stamped() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_parse_actions() {
        assert_eq!(parse_action("open:/about"), Ok(Action::Open("/about".to_string())));
        assert_eq!(parse_action("open"), Ok(Action::Open(String::new())));
        assert_eq!(parse_action("close:about"), Ok(Action::Close("about".to_string())));
        assert_eq!(parse_action("move:projects/lumen:2"), Ok(Action::Move("projects/lumen".to_string(), 2)));
        assert_eq!(parse_action("back"), Ok(Action::Back));
        assert_eq!(parse_action("close-all"), Ok(Action::CloseAll));
    }

    #[test]
    fn test_parse_action_errors() {
        assert!(parse_action("close").is_err());
        assert!(parse_action("move:about").is_err());
        assert!(parse_action("move:about:x").is_err());
        assert!(parse_action("jump:about").is_err());
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
