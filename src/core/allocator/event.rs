use super::strategy::FitStrategy;

/// Notification sent to subscribers after a ledger operation
/// succeeded. Rejected operations emit nothing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LedgerEvent {
    /// A block was handed out.
    Allocated {
        address: u64,
        size: u64,
        owner: Option<String>,
        strategy: FitStrategy,
    },
    /// An owner tag was used for the first time since the ledger
    /// was created or last reset. Sent before the matching
    /// `Allocated` event.
    OwnerSeen { owner: String },
    /// A block was returned to the free pool.
    Deallocated { address: u64, size: u64 },
    /// Coalescing merged `merges` pairs of free blocks.
    Coalesced { merges: usize },
    /// The ledger went back to a single free block.
    Reset { total_size: u64 },
}

/// Subscriber to ledger events.
///
/// Any `FnMut(&LedgerEvent)` closure is an observer, so most
/// callers never implement this by hand.
pub trait LedgerObserver {
    fn notify(&mut self, event: &LedgerEvent);
}

impl<F> LedgerObserver for F
where
    F: FnMut(&LedgerEvent),
{
    fn notify(&mut self, event: &LedgerEvent) {
        self(event)
    }
}
