use std::io;

use anyhow::Context;
use bookfinder::app::App;
use bookfinder::cli::Cli;
use bookfinder::config::BookfinderConfig;
use bookfinder::logging::init_logging;
use bookfinder::runtime::Runtime;
use catalog_api::{CatalogApiClient, CatalogApiConfig};
use clap::Parser;
use library_api::{LibraryApiClient, LibraryApiConfig};
use library_sync::{LibrarySync, SessionHandle};
use session_store::SessionStore;
use tokio::io::BufReader;
use tokio::task::LocalSet;
use tracing::info;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging().context("failed to initialize logging")?;

    let cwd = std::env::current_dir().context("failed to resolve working directory")?;
    let config = BookfinderConfig::load(&cwd, &cli.overrides())?;
    info!(backend = %config.backend_url, catalog = %config.catalog_url, "starting bookfinder");

    let store = SessionStore::open_or_reset(&config.session_path)
        .context("failed to open the session store")?;
    let session = SessionHandle::new(store);

    let mut backend_config = LibraryApiConfig::new(config.backend_url.clone());
    let mut catalog_config = CatalogApiConfig::new().with_base_url(config.catalog_url.clone());
    if let Some(timeout) = config.timeout {
        backend_config = backend_config.with_timeout(timeout);
        catalog_config = catalog_config.with_timeout(timeout);
    }
    let backend = LibraryApiClient::new(backend_config).context("invalid backend configuration")?;
    let catalog = CatalogApiClient::new(catalog_config).context("invalid catalog configuration")?;

    let app = App::with_notification_ttl(session.is_authenticated(), config.notification_ttl);
    let sync = LibrarySync::new(backend, session);
    let mut runtime = Runtime::new(app, sync, catalog, io::stdout());

    let tokio_runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    let local = LocalSet::new();
    local.block_on(
        &tokio_runtime,
        runtime.run(BufReader::new(tokio::io::stdin())),
    )?;

    Ok(())
}
