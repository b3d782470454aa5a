//! View state controller
//!
//! Sequences select image → encode → analyze → render state as an explicit
//! finite state machine. The current [`ViewState`] is a single immutable
//! value replaced wholesale on every transition and published through a
//! watch channel for the presentation layer to render.

use std::sync::{Mutex, MutexGuard};

use tokio::sync::watch;
use tracing::warn;

use crate::analyzer::Analyzer;
use crate::error::Error;
use crate::image::{self, AssetId, ImageAsset};
use crate::types::AnalysisResult;

/// What the UI should currently render
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ViewState {
    #[default]
    Idle,
    Loading,
    Success(AnalysisResult),
    Error(String),
}

struct Inner {
    asset: Option<(AssetId, ImageAsset)>,
    next_id: u64,
}

/// Drives the analysis round-trip and owns the current [`ViewState`].
///
/// At most one analysis request is in flight at a time: `request_analysis`
/// while already Loading is a no-op. A response that arrives after the asset
/// it was issued for has been replaced is dropped silently.
pub struct SafetyController<A: Analyzer> {
    analyzer: A,
    inner: Mutex<Inner>,
    tx: watch::Sender<ViewState>,
}

impl<A: Analyzer> SafetyController<A> {
    pub fn new(analyzer: A) -> Self {
        let (tx, _rx) = watch::channel(ViewState::Idle);
        Self {
            analyzer,
            inner: Mutex::new(Inner {
                asset: None,
                next_id: 0,
            }),
            tx,
        }
    }

    /// Read-only subscription to the current view state.
    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.tx.subscribe()
    }

    /// Snapshot of the current view state.
    pub fn view_state(&self) -> ViewState {
        self.tx.borrow().clone()
    }

    /// Captures a new image, clearing any prior result or error.
    ///
    /// Allowed from any state. The asset gets a fresh identity tag, so a
    /// response to an analysis of the previous asset can no longer land.
    pub fn select_image(&self, asset: ImageAsset) -> AssetId {
        let mut inner = self.lock();
        inner.next_id += 1;
        let id = AssetId::new(inner.next_id);
        inner.asset = Some((id, asset));
        self.tx.send_replace(ViewState::Idle);
        id
    }

    /// Runs one analysis round-trip for the currently selected image.
    ///
    /// With no image selected this transitions straight to Error without
    /// touching the network. While a request is already in flight the call
    /// is ignored.
    pub async fn request_analysis(&self) {
        let (id, asset) = {
            let inner = self.lock();
            if matches!(*self.tx.borrow(), ViewState::Loading) {
                return;
            }
            let Some((id, asset)) = inner.asset.clone() else {
                self.tx.send_replace(ViewState::Error(Error::NoImage.to_string()));
                return;
            };
            self.tx.send_replace(ViewState::Loading);
            (id, asset)
        };

        // Encoding failure must not reach the network.
        let payload = match image::encode(&asset) {
            Ok(payload) => payload,
            Err(e) => {
                self.complete(id, ViewState::Error(e.to_string()));
                return;
            }
        };

        let next = match self.analyzer.analyze(&payload).await {
            Ok(result) => ViewState::Success(result),
            Err(e) => ViewState::Error(format!("analysis failed: {e}")),
        };
        self.complete(id, next);
    }

    /// Applies a finished transition unless the asset changed while the
    /// request was in flight.
    fn complete(&self, id: AssetId, next: ViewState) {
        let inner = self.lock();
        let current = inner.asset.as_ref().map(|(id, _)| *id);
        if current != Some(id) {
            warn!("dropping stale analysis response");
            return;
        }
        self.tx.send_replace(next);
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
