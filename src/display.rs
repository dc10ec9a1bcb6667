//! Status-display refresh scheduling.
//!
//! Redraws of the idle status view must never interleave with a transient
//! overlay (toast or QR code). The scheduler latches redraw requests and
//! services them on the first tick with no overlay active.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Target of a scheduled redraw.
///
/// `redraw` is only invoked while no overlay is active; `attached`
/// reports whether a display exists at all.
pub trait StatusView: Send + Sync {
    fn attached(&self) -> bool;
    fn redraw(&self);
}

/// Latches redraw requests until they can be serviced.
///
/// The pending flag is atomic so requests may come from the engine thread
/// (switch writes) as well as the orchestration loop.
pub struct DisplayScheduler {
    pending: AtomicBool,
    view: Arc<dyn StatusView>,
}

impl DisplayScheduler {
    pub fn new(view: Arc<dyn StatusView>) -> Self {
        Self {
            pending: AtomicBool::new(false),
            view,
        }
    }

    /// Mark the status view dirty. The redraw happens on a later tick,
    /// once no overlay is active.
    pub fn request_redraw(&self) {
        self.pending.store(true, Ordering::SeqCst);
    }

    pub fn redraw_pending(&self) -> bool {
        self.pending.load(Ordering::SeqCst)
    }

    /// Service a pending redraw if no overlay is active.
    ///
    /// Returns whether a redraw was actually drawn. A pending request
    /// survives overlay-gated ticks; with no display attached it is
    /// consumed as a no-op.
    pub fn tick(&self, overlay_active: bool) -> bool {
        if overlay_active || !self.pending.load(Ordering::SeqCst) {
            return false;
        }
        self.pending.store(false, Ordering::SeqCst);
        if !self.view.attached() {
            return false;
        }
        self.view.redraw();
        true
    }
}
