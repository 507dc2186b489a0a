use anyhow::{Context as _, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use webview_pages::core::config_manager;
use webview_pages::core::services::telemetry_service::log_telemetry_event;
use webview_pages::host::{FsContentReader, PanelMessage};
use webview_pages::{
    ChangelogPage, GlobalState, HeadlessHost, JsonFileGlobalState, PageContext,
    TelemetryBusContainer, WebViewController, WebViewPage, WelcomePage,
};

/// Page to preview
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum PageKind {
    /// Welcome page
    Welcome,
    /// Release notes
    Changelog,
}

/// Headless preview of a web page panel
#[derive(Debug, Parser)]
#[command(name = "webview-pages")]
#[command(about = "Render a web page panel against the headless host")]
#[command(version)]
struct Args {
    /// Config file (defaults to the user data directory)
    #[arg(long = "config")]
    config_path: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = PageKind::Welcome)]
    page: PageKind,

    /// Bypass the startup check
    #[arg(long)]
    show: bool,

    /// Write the rendered markup here instead of stdout
    #[arg(long)]
    out: Option<PathBuf>,

    /// Message delivered as if posted by the page's content (repeatable)
    #[arg(long = "message", value_name = "JSON")]
    messages: Vec<String>,
}

/// Use the `--config` path, or the config in the user data directory
fn resolve_config_path(custom: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = custom {
        return Ok(path);
    }

    let path = config_manager::initialize_user_config()?;
    tracing::info!("Using config from user data directory: {}", path.display());
    Ok(path)
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    init_logging();

    let args = Args::parse();

    if let Err(e) = run(args).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    let config_path = resolve_config_path(args.config_path.clone())?;
    let config = config_manager::load_config(&config_path)?;

    let pages_dir = match &config.pages_dir {
        Some(dir) => config_manager::initialize_pages_dir_at(dir)?,
        None => config_manager::initialize_pages_dir()?,
    };

    let state_path = config
        .state_file
        .clone()
        .unwrap_or_else(config_manager::get_state_file_path);
    let global_state: Arc<dyn GlobalState> = Arc::new(
        JsonFileGlobalState::open(state_path)
            .await
            .context("Failed to open global state")?,
    );

    let telemetry = TelemetryBusContainer::with_enabled(config.telemetry.enabled);
    telemetry.subscribe(log_telemetry_event);

    let host = Arc::new(HeadlessHost::with_scheme(config.resource_scheme.clone()));
    let context = PageContext {
        global_state: global_state.clone(),
        telemetry: Arc::new(telemetry),
        host: host.clone(),
        content: Arc::new(FsContentReader),
        resource_root: config.resource_root.clone(),
    };

    match args.page {
        PageKind::Welcome => {
            let controller = WebViewController::new(WelcomePage::new(&pages_dir), context);
            preview(controller, &host, &args).await
        }
        PageKind::Changelog => {
            let page = ChangelogPage::new(&pages_dir, global_state);
            let controller = WebViewController::new(page, context);
            preview(controller, &host, &args).await
        }
    }
}

async fn preview<P: WebViewPage>(
    controller: Arc<WebViewController<P>>,
    host: &HeadlessHost,
    args: &Args,
) -> Result<()> {
    if args.show {
        controller.show().await?;
    } else {
        controller.check_and_show().await?;
    }

    let Some(panel) = host.active_panel() else {
        tracing::info!(
            "{} is not shown on startup (use --show to open it anyway)",
            controller.config().view_type
        );
        return Ok(());
    };

    for raw in &args.messages {
        let message: PanelMessage = serde_json::from_str(raw)
            .with_context(|| format!("Invalid --message JSON object: {}", raw))?;
        panel.deliver_message(message).await;
    }
    for posted in panel.posted_messages() {
        tracing::info!("Panel received: {}", posted);
    }

    let html = panel.html().unwrap_or_default();
    match &args.out {
        Some(path) => {
            std::fs::write(path, html)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!("Rendered page written to {}", path.display());
        }
        None => println!("{}", html),
    }

    controller.dispose();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_defaults() {
        let args = Args::try_parse_from(["webview-pages"]).unwrap();
        assert_eq!(args.page, PageKind::Welcome);
        assert!(!args.show);
        assert!(args.config_path.is_none());
        assert!(args.messages.is_empty());
    }

    #[test]
    fn test_args_repeated_messages_and_page() {
        let args = Args::try_parse_from([
            "webview-pages",
            "--page",
            "changelog",
            "--show",
            "--message",
            r#"{"command":"documentReady"}"#,
            "--message",
            r#"{"command":"openLink"}"#,
            "--out",
            "page.html",
        ])
        .unwrap();
        assert_eq!(args.page, PageKind::Changelog);
        assert!(args.show);
        assert_eq!(args.messages.len(), 2);
        assert_eq!(args.out, Some(PathBuf::from("page.html")));
    }

    #[test]
    fn test_args_rejects_unknown_page() {
        assert!(Args::try_parse_from(["webview-pages", "--page", "settings"]).is_err());
    }
}
