mod config;
mod domain;
mod error;
mod kosync_api;
mod storage;
mod sync;

use std::{path::Path, sync::Arc};

use anyhow::Context;
use config::Config;
use domain::SystemClock;
use poem::{
    EndpointExt, Route, Server,
    listener::TcpListener,
    middleware::{Cors, Tracing as PoemTracing},
};
use poem_openapi::OpenApiService;
use storage::FileStore;
use sync::SyncService;
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, fmt::SubscriberBuilder, prelude::*};

type KosyncResult<T> = anyhow::Result<T>;

#[tokio::main]
async fn main() -> KosyncResult<()> {
    // Respect RUST_LOG if set, default to info for our crate and poem.
    let default_filter = format!("{}=info,poem=info", env!("CARGO_PKG_NAME"));
    let env_filter = std::env::var("RUST_LOG").unwrap_or(default_filter);
    SubscriberBuilder::default()
        .with_env_filter(EnvFilter::new(env_filter))
        .with_target(false)
        .with_level(true)
        .pretty()
        .finish()
        .with(ErrorLayer::default())
        .init();
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "starting KOReader sync server"
    );
    if Path::new(".env.local").exists() {
        dotenvy::from_filename(".env.local")?;
    } else if Path::new(".env").exists() {
        dotenvy::from_filename(".env")?;
    };
    let config = Config::load()?;
    if let Err(e) = config.validate() {
        return Err(anyhow::anyhow!(e));
    }

    std::fs::create_dir_all(&config.db_dir)
        .with_context(|| format!("Failed to create database directory {:?}", config.db_dir))?;
    let store = FileStore::open(&config.db_dir)
        .with_context(|| format!("Failed to open store at {:?}", config.db_dir))?;
    tracing::info!(db_dir = %store.root().display(), "storing data");
    if !config.registration_enabled {
        tracing::info!("registration disabled");
    }

    let sync = SyncService::new(Arc::new(store), Arc::new(SystemClock))
        .with_registration(config.registration_enabled);
    run_poem(Arc::new(sync), &config.listen).await
}

pub async fn run_poem(sync: Arc<SyncService>, bind_addr: &str) -> KosyncResult<()> {
    let version = env!("CARGO_PKG_VERSION");
    let api = kosync_api::KosyncApi { sync };
    let api_service = OpenApiService::new(api, "KOReader Sync API", version);
    let ui = api_service.rapidoc();
    let spec = api_service.spec();
    let route = Route::new()
        .nest("/", api_service)
        .nest("/ui", ui)
        .nest("/spec", poem::endpoint::make_sync(move |_| spec.clone()))
        .with(Cors::new())
        .with(PoemTracing);

    tracing::info!(%bind_addr, "starting HTTP server");
    Server::new(TcpListener::bind(bind_addr.to_string())).run(route).await?;
    Ok(())
}
