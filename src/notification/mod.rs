use std::collections::BTreeMap;

use async_channel::{Receiver, Sender};

use crate::model::error::catalog_errors::CatalogingError;
use crate::model::error::catalog_errors::ProcessAssetError;
use crate::model::repository::{Asset, Folder};

/// why a [`CatalogChangeEvent`] was published
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum CatalogChangeReason {
    AssetCreated,
    AssetUpdated,
    AssetDeleted,
    AssetNotCreated,
    FolderCreated,
    FolderDeleted,
    FolderInspectionInProgress,
    FolderInspectionCompleted,
    BackupCreationStarted,
    BackupUpdateStarted,
    NoBackupChangesDetected,
    BackupCompleted,
    ProcessCancelled,
    ProcessFailed,
    ProcessEnded,
}

/// the failure carried by a [`CatalogChangeEvent`] when its reason indicates something went wrong
#[derive(Debug, PartialEq, Clone)]
pub enum CatalogEventError {
    Asset(ProcessAssetError),
    Cataloging(CatalogingError),
}

/// catalog assets grouped by the path of their folder
pub type CataloguedAssetsByPath = BTreeMap<String, Vec<Asset>>;

/// a one-way notification from the cataloging worker to whoever is observing it.
/// Everything in here is owned, so observers never share state with the worker
#[derive(Debug, PartialEq, Clone)]
pub struct CatalogChangeEvent {
    pub reason: CatalogChangeReason,
    pub message: String,
    pub asset: Option<Asset>,
    pub folder: Option<Folder>,
    pub catalogued_assets_by_path: Option<CataloguedAssetsByPath>,
    pub error: Option<CatalogEventError>,
}

impl CatalogChangeEvent {
    pub fn new(reason: CatalogChangeReason, message: impl Into<String>) -> Self {
        Self {
            reason,
            message: message.into(),
            asset: None,
            folder: None,
            catalogued_assets_by_path: None,
            error: None,
        }
    }

    pub fn with_asset(mut self, asset: Asset) -> Self {
        self.asset = Some(asset);
        self
    }

    pub fn with_folder(mut self, folder: Folder) -> Self {
        self.folder = Some(folder);
        self
    }

    pub fn with_snapshot(mut self, snapshot: CataloguedAssetsByPath) -> Self {
        self.catalogued_assets_by_path = Some(snapshot);
        self
    }

    pub fn with_error(mut self, error: CatalogEventError) -> Self {
        self.error = Some(error);
        self
    }
}

/// publishing side of the notification channel. Cloning a notifier shares the same channel
#[derive(Clone)]
pub struct CatalogNotifier {
    sender: Sender<CatalogChangeEvent>,
}

impl CatalogNotifier {
    /// creates a notifier whose queue holds at most `capacity` events; publishing blocks while the queue is full
    pub fn bounded(capacity: usize) -> (Self, Receiver<CatalogChangeEvent>) {
        let (sender, receiver) = async_channel::bounded(capacity);
        (Self { sender }, receiver)
    }

    pub fn unbounded() -> (Self, Receiver<CatalogChangeEvent>) {
        let (sender, receiver) = async_channel::unbounded();
        (Self { sender }, receiver)
    }

    /// a notifier nobody listens to
    pub fn disconnected() -> Self {
        let (notifier, _) = Self::unbounded();
        notifier
    }

    /// publishes the event. Having no observers left is not an error for the worker
    pub fn notify(&self, event: CatalogChangeEvent) {
        if self.sender.is_closed() {
            log::debug!("No observers for event {:?}: {}", event.reason, event.message);
            return;
        }
        if let Err(e) = self.sender.send_blocking(event) {
            log::debug!("Observers went away before event could be sent: {:?}", e.0.reason);
        }
    }
}
