mod config;
mod errors;
mod handlers;
mod listing;
mod logger;
mod nav;
mod page;
mod resolve;
mod templates;
mod types;
mod utils;

use std::sync::Arc;

use axum::{Router, routing::get};
use clap::Parser;
use log::info;
use tokio::net::TcpListener;

use config::Config;
use errors::ServeError;
use handlers::{handle_path, handle_root};
use logger::Logger;
use templates::TemplateCache;
use types::AppState;

#[tokio::main]
async fn main() -> Result<(), ServeError> {
    let config = Config::parse();
    if let Err(err) = Logger::init() {
        eprintln!("Logger setup failed: {err}");
    }

    let state = AppState {
        sites_dir: Arc::new(config.sites.clone()),
        templates: Arc::new(TemplateCache::new(config.template_max_age())),
    };

    let app = Router::new()
        .route("/", get(handle_root))
        .route("/*path", get(handle_path))
        .with_state(state);

    info!("Listening on http://{}", config.listen);
    let listener = TcpListener::bind(&config.listen).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
