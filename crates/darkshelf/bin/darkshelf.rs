#[macro_use]
extern crate log;

use std::time::Duration;

use clap::Parser;
use darkshelf::{
    application::worker::{self, progress},
    domain::{
        entities::sync::SyncSettings, repositories::snapshot::SnapshotRepository,
        services::image::ImageService,
    },
    infrastructure::{
        config::Config,
        domain::repositories::{
            comic::ComicRepositoryImpl, image::ImageRepositoryImpl,
            snapshot::SnapshotRepositoryImpl,
        },
        http, utils,
    },
    presentation::ServerBuilder,
};

#[derive(Parser)]
struct Opts {
    /// Path to config file
    #[clap(long)]
    config: Option<String>,
}

fn init_logger() {
    let mut builder = env_logger::Builder::new();
    match (std::env::var("RUST_LOG"), std::env::var("DARKSHELF_LOG")) {
        (Ok(rust_log), _) => builder.parse_filters(&rust_log),
        (Err(_), Ok(level)) => builder.parse_filters(&format!(
            "warn,darkshelf={level},darkshelf_lib={level}"
        )),
        _ => builder.parse_filters("warn,darkshelf=info"),
    };
    builder.init();
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    init_logger();
    info!(
        "darkshelf {} (catalog model {})",
        env!("CARGO_PKG_VERSION"),
        darkshelf_lib::LIB_VERSION
    );

    let opts: Opts = Opts::parse();
    let config = Config::open(opts.config)?;

    debug!("config: {:?}", config);

    utils::enter_asset_root(&config.public_dir)?;

    let client = http::build_client(
        Duration::from_secs(config.request_timeout),
        Duration::from_secs(config.connect_timeout),
    )?;

    let snapshot_repo = SnapshotRepositoryImpl::new(&config.snapshot_path);
    match snapshot_repo.load().await {
        Ok(entries) => info!(
            "{} comics in {}",
            entries.len(),
            snapshot_repo.path().display()
        ),
        Err(e) => warn!("unreadable snapshot {}: {e}", snapshot_repo.path().display()),
    }

    let settings = SyncSettings {
        max_id: config.max_id,
        workers: config.workers,
        max_attempts: config.max_attempts,
    };
    let comic_repo = ComicRepositoryImpl::from_config(client.clone(), &config);
    let sync_worker = if config.show_progress {
        worker::sync::SyncWorker::new(comic_repo, snapshot_repo, settings, progress::progress_bar())
    } else {
        worker::sync::SyncWorker::new(comic_repo, snapshot_repo, settings, ())
    };

    let (sync_tx, sync_worker_handle) = worker::sync::start(
        sync_worker,
        Duration::from_secs(config.startup_delay),
        config.sync_interval,
    );

    #[cfg(unix)]
    let _signal_handle = worker::signal::listen(sync_tx.clone())?;
    #[cfg(not(unix))]
    let _ = &sync_tx;

    let image_repo = ImageRepositoryImpl::new(client, &config.image_host, &config.image_referer);
    let server_fut = ServerBuilder::new()
        .with_public_dir(&config.public_dir)
        .with_image_svc(ImageService::new(image_repo))
        .build()?
        .serve(([0, 0, 0, 0], config.port));

    tokio::select! {
        res = server_fut => {
            res?;
            info!("server shutdown");
        }
        _ = sync_worker_handle => {
            info!("sync worker quit");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("ctrl+c signal");
        }
    }

    Ok(())
}
