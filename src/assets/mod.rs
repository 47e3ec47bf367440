//! Asynchronous asset loading.
//!
//! Loads run on worker threads and report back over a channel. The loop
//! thread calls [`AssetTracker::pump`] at the start of each tick and attaches
//! whatever finished since the last one.

mod loader;
mod model;

pub use loader::{load_blocking, spawn_load};
pub use model::{ModelDesc, ModelPart};

use std::path::{Path, PathBuf};
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender};
use tracing::{debug, warn};

use crate::error::AssetError;

/// Handle to a registered asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssetId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Model,
    Font,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetState {
    Loading,
    Ready,
    Failed,
}

impl AssetState {
    /// Ready or Failed
    pub fn is_settled(self) -> bool {
        !matches!(self, AssetState::Loading)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AssetPayload {
    Model(ModelDesc),
    /// Raw font file bytes
    Font(Vec<u8>),
}

/// Completion message sent by a loader
#[derive(Debug)]
pub struct AssetEvent {
    pub id: AssetId,
    pub result: Result<AssetPayload, AssetError>,
}

#[derive(Debug)]
struct AssetEntry {
    kind: AssetKind,
    path: PathBuf,
    required: bool,
    state: AssetState,
}

/// Owns the completion channel and the state of every registered asset
#[derive(Debug)]
pub struct AssetTracker {
    entries: Vec<AssetEntry>,
    sender: Sender<AssetEvent>,
    receiver: Receiver<AssetEvent>,
}

impl Default for AssetTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl AssetTracker {
    pub fn new() -> Self {
        let (sender, receiver) = crossbeam_channel::unbounded();
        Self {
            entries: Vec::new(),
            sender,
            receiver,
        }
    }

    /// Registers an asset in the Loading state without starting a load
    pub fn register(&mut self, kind: AssetKind, path: impl Into<PathBuf>, required: bool) -> AssetId {
        let id = AssetId(self.entries.len() as u32);
        self.entries.push(AssetEntry {
            kind,
            path: path.into(),
            required,
            state: AssetState::Loading,
        });
        id
    }

    /// Starts the background load of a registered asset
    pub fn load(&self, id: AssetId) -> Result<(), AssetError> {
        let entry = self.entry(id).ok_or(AssetError::Unknown(id))?;
        debug!(?id, kind = ?entry.kind, path = %entry.path.display(), required = entry.required, "loading asset");
        spawn_load(id, entry.kind, entry.path.clone(), self.sender.clone());
        Ok(())
    }

    /// Registers an asset and starts loading it
    pub fn request(&mut self, kind: AssetKind, path: impl Into<PathBuf>, required: bool) -> AssetId {
        let id = self.register(kind, path, required);
        spawn_load(id, kind, self.entries[id.0 as usize].path.clone(), self.sender.clone());
        id
    }

    /// Channel that completions are delivered on
    pub fn sender(&self) -> Sender<AssetEvent> {
        self.sender.clone()
    }

    /// Drains completed loads, updating states.
    ///
    /// Returns the events for assets that were still Loading; completions for
    /// unknown or already settled assets are dropped.
    pub fn pump(&mut self) -> Vec<AssetEvent> {
        let mut completed = Vec::new();
        while let Ok(event) = self.receiver.try_recv() {
            if let Some(event) = self.settle(event) {
                completed.push(event);
            }
        }
        completed
    }

    /// Like [`pump`](Self::pump) but waits up to `timeout` for the first event
    pub fn pump_timeout(&mut self, timeout: Duration) -> Vec<AssetEvent> {
        let mut completed = Vec::new();
        if let Ok(event) = self.receiver.recv_timeout(timeout) {
            if let Some(event) = self.settle(event) {
                completed.push(event);
            }
        }
        completed.extend(self.pump());
        completed
    }

    fn settle(&mut self, event: AssetEvent) -> Option<AssetEvent> {
        let Some(entry) = self.entries.get_mut(event.id.0 as usize) else {
            warn!(id = ?event.id, "completion for unknown asset");
            return None;
        };
        if entry.state.is_settled() {
            warn!(id = ?event.id, state = ?entry.state, "duplicate asset completion ignored");
            return None;
        }

        match &event.result {
            Ok(_) => {
                entry.state = AssetState::Ready;
                debug!(id = ?event.id, path = %entry.path.display(), "asset ready");
            }
            Err(err) => {
                entry.state = AssetState::Failed;
                warn!(id = ?event.id, required = entry.required, error = %err, "asset failed to load");
            }
        }
        Some(event)
    }

    pub fn state(&self, id: AssetId) -> Option<AssetState> {
        self.entry(id).map(|e| e.state)
    }

    pub fn kind(&self, id: AssetId) -> Option<AssetKind> {
        self.entry(id).map(|e| e.kind)
    }

    pub fn path(&self, id: AssetId) -> Option<&Path> {
        self.entry(id).map(|e| e.path.as_path())
    }

    /// Every required asset is Ready or Failed
    pub fn required_settled(&self) -> bool {
        self.entries
            .iter()
            .filter(|e| e.required)
            .all(|e| e.state.is_settled())
    }

    pub fn all_settled(&self) -> bool {
        self.entries.iter().all(|e| e.state.is_settled())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn entry(&self, id: AssetId) -> Option<&AssetEntry> {
        self.entries.get(id.0 as usize)
    }
}
