use std::collections::HashMap;

use log::debug;

use crate::core::allocator::LedgerEvent;

/// Colours handed out to owners, in order. Once they are all
/// used, assignment starts over from the first one.
pub const OWNER_COLORS: [&str; 8] = [
    "#FFDAB9", "#E6E6FA", "#AFEEEE", "#F08080", "#98FB98", "#DDA0DD", "#B0E0E6", "#FFA07A",
];

/// Colour of allocated blocks without an owner.
pub const ALLOCATED_COLOR: &str = "#ADD8E6";
/// Colour of free blocks.
pub const FREE_COLOR: &str = "#F0FFF0";

/// Display colour of each owner, assigned when the ledger first
/// sees the owner and forgotten when the ledger is reset.
#[derive(Debug, Default)]
pub struct Palette {
    colors: HashMap<String, &'static str>,
    next_color: usize,
}

impl Palette {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, event: &LedgerEvent) {
        match event {
            LedgerEvent::OwnerSeen { owner } => self.assign(owner),
            LedgerEvent::Reset { .. } => self.clear(),
            _ => (),
        }
    }

    pub fn color_of(&self, owner: &str) -> Option<&'static str> {
        self.colors.get(owner).copied()
    }

    /// Colour to draw a block with.
    pub fn block_color(&self, allocated: bool, owner: Option<&str>) -> &'static str {
        match (allocated, owner) {
            (false, _) => FREE_COLOR,
            (true, Some(owner)) => self.color_of(owner).unwrap_or(ALLOCATED_COLOR),
            (true, None) => ALLOCATED_COLOR,
        }
    }

    /// Owners and their colours, sorted by owner.
    pub fn legend(&self) -> Vec<(&str, &'static str)> {
        let mut legend: Vec<_> = self
            .colors
            .iter()
            .map(|(owner, color)| (owner.as_str(), *color))
            .collect();
        legend.sort_unstable();
        legend
    }

    fn assign(&mut self, owner: &str) {
        if self.colors.contains_key(owner) {
            return;
        }

        let color = OWNER_COLORS[self.next_color % OWNER_COLORS.len()];
        self.next_color += 1;
        debug!("Owner {owner} gets colour {color}.");
        self.colors.insert(owner.to_string(), color);
    }

    fn clear(&mut self) {
        self.colors.clear();
        self.next_color = 0;
    }
}
