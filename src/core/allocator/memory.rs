/// Contiguous run of the simulated address space with a single
/// allocation status.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemoryBlock {
    /// Offset of the block within the address space.
    pub start_address: u64,
    /// Length of the block. Never zero.
    pub size: u64,
    /// Whether the block is currently handed out.
    pub allocated: bool,
    /// Tag of the owner (a process identifier, for example).
    /// Only ever set on allocated blocks.
    pub owner: Option<String>,
}

impl MemoryBlock {
    /// Creates a free block.
    pub fn free(start_address: u64, size: u64) -> Self {
        Self {
            start_address,
            size,
            allocated: false,
            owner: None,
        }
    }

    /// Address one past the last unit of the block.
    pub fn end_address(&self) -> u64 {
        self.start_address + self.size
    }

    pub fn is_free(&self) -> bool {
        !self.allocated
    }

    /// Returns true if `other` starts exactly where this block
    /// ends.
    pub fn precedes(&self, other: &MemoryBlock) -> bool {
        self.end_address() == other.start_address
    }

    pub(super) fn claim(&mut self, owner: Option<String>) {
        self.allocated = true;
        self.owner = owner;
    }

    pub(super) fn release(&mut self) {
        self.allocated = false;
        self.owner = None;
    }
}
