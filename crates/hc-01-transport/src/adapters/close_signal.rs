use tokio::sync::watch;

/// One-shot "closed" flag that pending operations can wait on.
///
/// The flag only ever moves from open to closed.
#[derive(Debug)]
pub(crate) struct CloseSignal {
    tx: watch::Sender<bool>,
}

impl CloseSignal {
    pub(crate) fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx }
    }

    pub(crate) fn is_closed(&self) -> bool {
        *self.tx.borrow()
    }

    /// Mark closed. Returns `true` only for the call that performed the
    /// transition.
    pub(crate) fn close(&self) -> bool {
        !self.tx.send_replace(true)
    }

    /// Resolves once the signal is closed.
    pub(crate) async fn closed(&self) {
        let mut rx = self.tx.subscribe();
        if *rx.borrow_and_update() {
            return;
        }
        // The sender lives in `self`, so `changed` only fails if we are
        // being dropped, in which case there is nothing left to wait for.
        let _ = rx.changed().await;
    }
}
