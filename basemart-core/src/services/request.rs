//! Latest-issued-wins ordering for view requests.
//!
//! A view asks the gate for a ticket before it starts a fetch and checks the
//! ticket once the fetch resolves. Any ticket issued later for the same gate
//! makes the earlier one stale, so a slow response can never overwrite the
//! result of a newer request.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Debug, Default, Clone)]
pub struct RequestGate {
    latest: Arc<AtomicU64>,
}

#[derive(Debug)]
pub struct RequestTicket {
    id: u64,
    latest: Arc<AtomicU64>,
}

impl RequestGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self) -> RequestTicket {
        let id = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        RequestTicket {
            id,
            latest: Arc::clone(&self.latest),
        }
    }
}

impl RequestTicket {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn is_current(&self) -> bool {
        self.latest.load(Ordering::SeqCst) == self.id
    }
}
