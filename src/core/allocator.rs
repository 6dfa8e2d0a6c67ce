mod error;
mod event;
mod memory;
mod stats;
mod strategy;

use std::collections::HashSet;
use std::fmt;

use log::*;

pub use error::{AllocationError, DeallocationError, UnknownStrategy};
pub use event::{LedgerEvent, LedgerObserver};
pub use memory::MemoryBlock;
pub use stats::{LedgerStats, MemoryMap};
pub use strategy::FitStrategy;

use strategy::Candidate;

/// Ordered list of memory blocks that partitions a simulated
/// address space `[0, total_size)`.
///
/// Blocks are kept sorted by start address with no gaps, no
/// overlaps and never two free blocks side by side. Every
/// operation either applies completely or, when it returns an
/// error, leaves the ledger untouched.
pub struct BlockLedger {
    /// Size of the whole address space.
    total_size: u64,
    /// Blocks in address order.
    blocks: Vec<MemoryBlock>,
    /// Position in the candidate list where the next next-fit
    /// allocation starts looking.
    next_fit: usize,
    /// Owner tags used since creation or the last reset.
    seen_owners: HashSet<String>,
    /// Subscribers notified after each successful operation.
    observers: Vec<Box<dyn LedgerObserver>>,
}

impl BlockLedger {
    pub fn new(total_size: u64) -> Result<Self, AllocationError> {
        if total_size == 0 {
            return Err(AllocationError::InvalidSize(total_size.to_string()));
        }

        // At first the space is empty, so it holds a single free
        // block at address 0 that spans all of it.
        let ledger = Self {
            total_size,
            blocks: vec![MemoryBlock::free(0, total_size)],
            next_fit: 0,
            seen_owners: HashSet::new(),
            observers: Vec::new(),
        };

        info!("Memory ledger created ({total_size} units).");
        Ok(ledger)
    }

    /// Registers a callback that receives every event emitted
    /// from now on.
    pub fn subscribe<O>(&mut self, observer: O)
    where
        O: LedgerObserver + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    /// Carves a block of exactly `size` units out of a free block
    /// chosen by `strategy`, and returns its start address.
    pub fn allocate(
        &mut self,
        size: u64,
        owner: Option<&str>,
        strategy: FitStrategy,
    ) -> Result<u64, AllocationError> {
        if size == 0 {
            debug!("Rejected allocation of size 0.");
            return Err(AllocationError::InvalidSize(size.to_string()));
        }

        // A blank owner tag counts as no owner at all.
        let owner = owner
            .map(str::trim)
            .filter(|owner| !owner.is_empty())
            .map(String::from);

        // Gather every free block that is large enough, in
        // ledger order, and let the strategy pick one of them.
        // Nothing has been modified yet, so failing here leaves
        // the ledger as it was.
        let candidates = self.candidates(size);
        let Some(index) = strategy.select(&candidates, &mut self.next_fit) else {
            let largest_free = self.largest_free_block();
            debug!("{strategy}: no free block of size {size} (largest is {largest_free}).");
            return Err(AllocationError::OutOfMemory {
                requested: size,
                largest_free,
            });
        };

        let block = &mut self.blocks[index];
        let address = block.start_address;

        // If the block is larger than the request, split it in
        // two parts: the front keeps the start address and is
        // handed out, while the rest of the former free block
        // is moved right after it. On an exact fit, the block is
        // simply claimed as is.
        if block.size > size {
            let remainder = MemoryBlock::free(address + size, block.size - size);
            block.size = size;
            self.blocks.insert(index + 1, remainder);
        }
        self.blocks[index].claim(owner.clone());

        debug!("{strategy}: allocated {size} at {address}.");
        debug_assert!(self.is_consistent());

        if let Some(owner) = &owner {
            if self.seen_owners.insert(owner.clone()) {
                self.emit(LedgerEvent::OwnerSeen {
                    owner: owner.clone(),
                });
            }
        }
        self.emit(LedgerEvent::Allocated {
            address,
            size,
            owner,
            strategy,
        });

        Ok(address)
    }

    /// Frees the allocated block starting at `address`, then
    /// merges it with any free neighbour.
    pub fn deallocate(&mut self, address: u64) -> Result<(), DeallocationError> {
        // Only an allocated block that starts exactly at the
        // address qualifies. A free block there is not told
        // apart from no block at all.
        let Some(block) = self
            .blocks
            .iter_mut()
            .find(|block| block.allocated && block.start_address == address)
        else {
            debug!("No allocated block at {address}.");
            return Err(DeallocationError::BlockNotFound(address));
        };

        let size = block.size;
        block.release();
        debug!("Deallocated {size} at {address}.");
        self.emit(LedgerEvent::Deallocated { address, size });

        self.coalesce();
        Ok(())
    }

    /// Merges every run of adjacent free blocks into a single
    /// block and returns the number of merges performed.
    ///
    /// Running it again right away does nothing.
    pub fn coalesce(&mut self) -> usize {
        // Blocks should already be in address order.
        self.blocks.sort_by_key(|block| block.start_address);

        let mut merges = 0;
        let mut i = 0;
        while i + 1 < self.blocks.len() {
            let (left, right) = (&self.blocks[i], &self.blocks[i + 1]);

            if left.is_free() && right.is_free() && left.precedes(right) {
                // The left block absorbs the right one, and stays
                // where it is so it can be compared against its
                // new right neighbour.
                let right = self.blocks.remove(i + 1);
                self.blocks[i].size += right.size;
                merges += 1;
            } else {
                i += 1;
            }
        }

        if merges > 0 {
            debug!("Coalesced {merges} free block pair(s).");
            self.emit(LedgerEvent::Coalesced { merges });
        }
        debug_assert!(self.is_consistent());

        merges
    }

    /// Drops every block and starts over with a single free block.
    /// The next-fit cursor and the set of known owners are
    /// cleared as well.
    pub fn reset(&mut self) {
        self.blocks = vec![MemoryBlock::free(0, self.total_size)];
        self.next_fit = 0;
        self.seen_owners.clear();

        info!("Memory ledger reset ({} units).", self.total_size);
        self.emit(LedgerEvent::Reset {
            total_size: self.total_size,
        });
    }

    pub fn total_size(&self) -> u64 {
        self.total_size
    }

    /// Blocks in address order.
    pub fn blocks(&self) -> &[MemoryBlock] {
        &self.blocks
    }

    pub fn next_fit_cursor(&self) -> usize {
        self.next_fit
    }

    pub fn free_block_count(&self) -> usize {
        self.blocks.iter().filter(|block| block.is_free()).count()
    }

    pub fn total_free(&self) -> u64 {
        self.blocks
            .iter()
            .filter(|block| block.is_free())
            .map(|block| block.size)
            .sum()
    }

    pub fn total_allocated(&self) -> u64 {
        self.blocks
            .iter()
            .filter(|block| block.allocated)
            .map(|block| block.size)
            .sum()
    }

    /// Always 0, see [`LedgerStats::internal_fragmentation`].
    pub fn internal_fragmentation(&self) -> u64 {
        0
    }

    pub fn largest_free_block(&self) -> u64 {
        self.blocks
            .iter()
            .filter(|block| block.is_free())
            .map(|block| block.size)
            .max()
            .unwrap_or(0)
    }

    pub fn external_fragmentation(&self) -> f64 {
        stats::external_fragmentation(self.total_free(), self.largest_free_block())
    }

    /// Display hint: true for a free block whose existing
    /// neighbours are all allocated, meaning it could not be
    /// merged into anything larger. The lone free block of an
    /// empty ledger is not flagged.
    pub fn is_externally_fragmented(&self, index: usize) -> bool {
        let Some(block) = self.blocks.get(index) else {
            return false;
        };
        if block.allocated || block.size == self.total_size {
            return false;
        }

        let left_free = index
            .checked_sub(1)
            .and_then(|i| self.blocks.get(i))
            .is_some_and(MemoryBlock::is_free);
        let right_free = self
            .blocks
            .get(index + 1)
            .is_some_and(MemoryBlock::is_free);

        !left_free && !right_free
    }

    pub fn stats(&self) -> LedgerStats {
        LedgerStats::from_blocks(self.total_size, &self.blocks)
    }

    pub fn memory_map(&self) -> MemoryMap<'_> {
        MemoryMap(&self.blocks)
    }

    /// Checks the structural invariants: the blocks cover
    /// `[0, total_size)` exactly, none is empty, no two free
    /// blocks touch, and only allocated blocks carry an owner.
    pub fn is_consistent(&self) -> bool {
        let Some(first) = self.blocks.first() else {
            return false;
        };
        let Some(last) = self.blocks.last() else {
            return false;
        };

        let contiguous = self.blocks.windows(2).all(|pair| pair[0].precedes(&pair[1]));
        let no_free_pairs = self
            .blocks
            .windows(2)
            .all(|pair| pair[0].allocated || pair[1].allocated);
        let sized = self.blocks.iter().all(|block| block.size > 0);
        let owners = self
            .blocks
            .iter()
            .all(|block| block.allocated || block.owner.is_none());

        first.start_address == 0
            && last.end_address() == self.total_size
            && contiguous
            && no_free_pairs
            && sized
            && owners
            && self.total_free() + self.total_allocated() == self.total_size
    }

    fn candidates(&self, size: u64) -> Vec<Candidate> {
        self.blocks
            .iter()
            .enumerate()
            .filter(|(_, block)| block.is_free() && block.size >= size)
            .map(|(index, block)| Candidate {
                index,
                size: block.size,
            })
            .collect()
    }

    fn emit(&mut self, event: LedgerEvent) {
        trace!("Ledger event: {event:?}");
        for observer in &mut self.observers {
            observer.notify(&event);
        }
    }
}

impl fmt::Debug for BlockLedger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockLedger")
            .field("total_size", &self.total_size)
            .field("blocks", &self.blocks)
            .field("next_fit", &self.next_fit)
            .field("seen_owners", &self.seen_owners)
            .field("observers", &self.observers.len())
            .finish()
    }
}
