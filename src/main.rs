use std::path::Path;
use std::process::ExitCode;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::thread;

use media_catalog::catalog::CatalogingService;
use media_catalog::config::parse_config;
use media_catalog::logging::init_logging;
use media_catalog::notification::CatalogNotifier;
use media_catalog::store::CatalogStore;
use media_catalog::sync::service::SyncAssetsService;

static CONFIG_LOCATION: &str = "./MediaCatalog.toml";
static EVENT_QUEUE_SIZE: usize = 256;

fn main() -> ExitCode {
    let config = match parse_config(Path::new(CONFIG_LOCATION)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to parse {CONFIG_LOCATION}: {e}");
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = init_logging(&config.logging) {
        eprintln!("Failed to set up logging: {e:?}");
        return ExitCode::FAILURE;
    }
    let store = match CatalogStore::open(&config) {
        Ok(store) => store,
        Err(e) => {
            log::error!("Failed to open the catalog: {e:?}");
            return ExitCode::FAILURE;
        }
    };

    let (notifier, receiver) = CatalogNotifier::bounded(EVENT_QUEUE_SIZE);
    let cancel = Arc::new(AtomicBool::new(false));
    let worker_cancel = Arc::clone(&cancel);
    let worker = thread::spawn(move || {
        let definitions = config.sync.definitions.clone();
        let mut cataloging = CatalogingService::new(config, store, notifier);
        let cataloged = match cataloging.catalog_assets(&worker_cancel) {
            Ok(summary) => {
                log::info!(
                    "Cataloged {} new, {} updated and {} deleted assets",
                    summary.assets_created,
                    summary.assets_updated,
                    summary.assets_deleted
                );
                true
            }
            Err(e) => {
                log::error!("Cataloging failed: {e:?}");
                false
            }
        };
        if let Err(e) = cataloging.store_mut().save_sync_definitions(&definitions) {
            log::warn!("Could not save sync definitions: {e:?}");
        }
        let synced = match SyncAssetsService::default().sync(&definitions, &worker_cancel) {
            Ok(results) => {
                for result in results {
                    log::info!("{}", result.message);
                }
                true
            }
            Err(e) => {
                log::error!("Sync failed: {e:?}");
                false
            }
        };
        cataloged && synced
    });

    // the worker drops the notifier when it's done, which ends this loop
    while let Ok(event) = receiver.recv_blocking() {
        match &event.error {
            Some(error) => log::warn!("{:?}: {} ({error:?})", event.reason, event.message),
            None => log::debug!("{:?}: {}", event.reason, event.message),
        }
    }
    match worker.join() {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(_) => {
            log::error!("Cataloging worker panicked");
            ExitCode::FAILURE
        }
    }
}
