use std::fmt;

use super::memory::MemoryBlock;

/// Snapshot of the derived ledger figures, as shown next to the
/// memory map.
#[derive(Clone, Debug, PartialEq)]
pub struct LedgerStats {
    pub total_size: u64,
    pub free_blocks: usize,
    pub total_free: u64,
    pub total_allocated: u64,
    /// Always 0: allocations are carved at exactly the requested
    /// size, so no block holds unused space.
    pub internal_fragmentation: u64,
    pub largest_free_block: u64,
    /// `1 - largest_free_block / total_free`, from 0 (all free
    /// space in one block) towards 1 (free space scattered).
    pub external_fragmentation: f64,
}

impl LedgerStats {
    pub fn from_blocks(total_size: u64, blocks: &[MemoryBlock]) -> Self {
        let (free, allocated): (Vec<&MemoryBlock>, Vec<&MemoryBlock>) =
            blocks.iter().partition(|block| block.is_free());

        let total_free = free.iter().map(|block| block.size).sum();
        let largest_free_block = free.iter().map(|block| block.size).max().unwrap_or(0);

        Self {
            total_size,
            free_blocks: free.len(),
            total_free,
            total_allocated: allocated.iter().map(|block| block.size).sum(),
            internal_fragmentation: 0,
            largest_free_block,
            external_fragmentation: external_fragmentation(total_free, largest_free_block),
        }
    }
}

pub(super) fn external_fragmentation(total_free: u64, largest_free_block: u64) -> f64 {
    if total_free == 0 {
        return 0.0;
    }

    let largest = largest_free_block.min(total_free) as f64;
    (1.0 - largest / total_free as f64).clamp(0.0, 1.0)
}

impl fmt::Display for LedgerStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total Memory: {}", self.total_size)?;
        writeln!(f, "Free Blocks: {}", self.free_blocks)?;
        writeln!(f, "Free Memory: {}", self.total_free)?;
        writeln!(f, "Allocated Memory: {}", self.total_allocated)?;
        writeln!(f, "Largest Free Block: {}", self.largest_free_block)?;
        writeln!(f, "Internal Fragmentation: {}", self.internal_fragmentation)?;
        write!(
            f,
            "External Fragmentation: {:.1}%",
            self.external_fragmentation * 100.0
        )
    }
}

/// Tabular view of the ledger, one block per line.
pub struct MemoryMap<'a>(pub &'a [MemoryBlock]);

impl fmt::Display for MemoryMap<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address\tSize\tStatus\t\tOwner")?;
        for block in self.0 {
            let status = if block.allocated { "Allocated" } else { "Free\t" };
            let owner = block.owner.as_deref().unwrap_or("-");
            write!(
                f,
                "\n{}\t{}\t{}\t{}",
                block.start_address, block.size, status, owner
            )?;
        }
        Ok(())
    }
}
