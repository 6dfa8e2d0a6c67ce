use thiserror::Error;

/// Reasons an allocation request can be rejected. A rejected
/// request never modifies the ledger.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AllocationError {
    /// No free block is large enough for the request, even if
    /// the total free space would be.
    #[error("Out of memory: no free block of size {requested} (largest free block: {largest_free}).")]
    OutOfMemory {
        requested: u64,
        largest_free: u64,
    },
    /// The size is zero or not an integer at all.
    #[error("Invalid size `{0}`: the size must be a positive integer.")]
    InvalidSize(String),
}

/// Reasons a deallocation request can be rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeallocationError {
    /// There is no allocated block starting at this address.
    /// A free block at the address is reported the same way.
    #[error("No allocated block found at address {0}.")]
    BlockNotFound(u64),
    /// The address is not a non-negative integer.
    #[error("Invalid address `{0}`.")]
    InvalidAddress(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown strategy `{0}` (expected first-fit, best-fit, worst-fit or next-fit).")]
pub struct UnknownStrategy(pub String);
