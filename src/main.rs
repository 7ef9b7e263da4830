//! git-revlens - line history server for a git work tree
//!
//! # Usage
//! ```bash
//! git-revlens /path/to/repository                 # Start server on port 3001
//! git-revlens . --max-commits 0                   # List full branch histories
//! RUST_LOG=git_revlens=debug git-revlens .        # Log every git query
//! ```

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use clap::Parser;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use git_revlens::config::{
    DEFAULT_CACHE_CAPACITY, DEFAULT_COMMIT_TEMPLATE, DEFAULT_DATE_FORMAT, DEFAULT_MAX_COMMITS,
    ExplorerConfig,
    Settings, validate_date_format,
};
use git_revlens::git::GitService;
use git_revlens::routes::{self, AppState};

/// git-revlens - Blame, history and comparisons for a git repository over HTTP
#[derive(Parser)]
#[command(name = "git-revlens")]
#[command(about = "Line-level revision history for a git work tree", long_about = None)]
struct Cli {
    /// Path inside the git repository to serve
    #[arg(value_name = "REPO_PATH", default_value = ".")]
    repo_path: String,

    /// Port to run the server on
    #[arg(short, long, default_value = "3001")]
    port: u16,

    /// Commits listed per branch before "Show All Commits" (0 lists everything)
    #[arg(long, default_value_t = DEFAULT_MAX_COMMITS)]
    max_commits: usize,

    /// Show the upstream branch next to local branch names
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    show_tracking_branch: bool,

    /// Commit label template
    #[arg(long, default_value = DEFAULT_COMMIT_TEMPLATE)]
    commit_template: String,

    /// chrono format for `${date}` in commit labels
    #[arg(long, default_value = DEFAULT_DATE_FORMAT)]
    date_format: String,

    /// Seconds blame and log results stay cached (0 disables caching)
    #[arg(long, default_value = "30")]
    cache_ttl_secs: u64,

    /// Most blame and log results kept cached at once
    #[arg(long, default_value_t = DEFAULT_CACHE_CAPACITY)]
    cache_capacity: usize,
}

impl Cli {
    fn into_settings(self) -> anyhow::Result<Settings> {
        validate_date_format(&self.date_format).map_err(|e| anyhow::anyhow!("--date-format: {e}"))?;
        Ok(Settings {
            repo_path: self.repo_path,
            port: self.port,
            cache_ttl: Duration::from_secs(self.cache_ttl_secs),
            cache_capacity: self.cache_capacity,
            explorer: ExplorerConfig {
                show_tracking_branch: self.show_tracking_branch,
                commit_template: self.commit_template,
                date_format: self.date_format,
                max_commits: (self.max_commits > 0).then_some(self.max_commits),
            },
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Cli::parse().into_settings()?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let service = Arc::new(GitService::with_capacity(settings.cache_ttl, settings.cache_capacity));
    let repo = match service.repository(&settings.repo_path) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("✗ Failed to open repository: {}", e);
            eprintln!("  Path: {}", settings.repo_path);
            std::process::exit(1);
        }
    };
    tracing::info!(path = %repo.path, explorer = ?settings.explorer, "serving repository");

    let state = AppState::new(service.clone(), &repo.path, settings.explorer.clone());

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .merge(routes::create_router(state))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let addr = format!("127.0.0.1:{}", settings.port);
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            eprintln!("✗ Failed to bind to port {}: {}", settings.port, e);
            eprintln!("  Try a different port with --port <PORT>");
            std::process::exit(1);
        }
    };

    println!();
    println!("  git-revlens");
    println!();
    println!("  Repository: {}", repo.path);
    println!("  Server:     http://{}", addr);
    println!();
    println!("  Press Ctrl+C to stop");
    println!();

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
        }
        println!("\n  Shutting down...");
    };

    axum::serve(listener, app).with_graceful_shutdown(shutdown).await?;

    Ok(())
}
