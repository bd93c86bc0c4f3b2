use tokio::task::JoinHandle;

/// Handle on the task forwarding provider events to the session manager.
/// Dropping it unsubscribes.
#[derive(Debug)]
pub struct EventSubscription {
    handle: JoinHandle<()>,
}

impl EventSubscription {
    pub(crate) fn new(handle: JoinHandle<()>) -> Self {
        Self { handle }
    }

    pub fn is_active(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl Drop for EventSubscription {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
