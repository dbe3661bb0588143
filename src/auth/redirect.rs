use tokio::sync::watch;

/// Signal telling the application shell to navigate to the login entry
/// point (the native equivalent of a full-page redirect).
///
/// Raised when a refresh attempt fails or the session is logged out;
/// observed by whatever owns the top-level navigation.
#[derive(Clone)]
pub struct LoginRedirect {
    tx: watch::Sender<bool>,
}

impl Default for LoginRedirect {
    fn default() -> Self {
        Self::new()
    }
}

impl LoginRedirect {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    /// Request navigation to the login entry point
    pub fn signal(&self) {
        // Send only fails when every receiver is gone, which is fine here
        let _ = self.tx.send(true);
    }

    /// Subscribe to navigation requests
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}
