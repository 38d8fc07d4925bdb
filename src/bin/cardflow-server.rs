//! Remote listing provider for the cardflow view.
//!
//! ```bash
//! cardflow-server                  # serve $HOME on 127.0.0.1:3001
//! cardflow-server --root /srv/data --port 8080
//! ```

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cardflow::server::{self, ServerState};
use cardflow::source;

/// Directory listing server for the cardflow browser view
#[derive(Parser)]
#[command(name = "cardflow-server")]
#[command(about = "Serves JSON directory listings for cardflow", long_about = None)]
struct Cli {
    /// Port to listen on
    #[arg(short, long, default_value = "3001")]
    port: u16,

    /// Root directory to serve; requests cannot escape it
    #[arg(short, long)]
    root: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let home = source::home_dir().unwrap_or_else(|| PathBuf::from("/"));
    let root = cli.root.unwrap_or_else(|| home.clone());
    let root = std::fs::canonicalize(&root)?;
    let home = if home.starts_with(&root) { home } else { root.clone() };

    let state = Arc::new(ServerState {
        root: root.clone(),
        home,
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = server::router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let addr = format!("127.0.0.1:{}", cli.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, root = %root.display(), "cardflow-server listening");

    let shutdown = async {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("shutting down");
        }
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
