use tokio::sync::watch;

/// Read side of a run's cancellation flag. Checked before every step; an
/// in-flight transaction is always allowed to finish.
#[derive(Debug, Clone)]
pub struct CancelFlag {
    rx: watch::Receiver<bool>,
}

/// Write side of a [`CancelFlag`].
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelFlag {
    /// A connected handle/flag pair.
    pub fn new() -> (CancelHandle, CancelFlag) {
        let (tx, rx) = watch::channel(false);
        (CancelHandle { tx }, CancelFlag { rx })
    }

    /// A flag that is never raised.
    pub fn never() -> Self {
        let (_tx, rx) = watch::channel(false);
        Self { rx }
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }
}

impl CancelHandle {
    /// Raise the flag for every clone of the paired [`CancelFlag`].
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}
