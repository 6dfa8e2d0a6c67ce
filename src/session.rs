use std::cell::{Ref, RefCell};
use std::io::{BufRead, Write};
use std::rc::Rc;

use anyhow::Result;
use log::*;

use crate::command::{Command, CommandError, HELP};
use crate::config::Config;
use crate::core::allocator::{BlockLedger, FitStrategy, LedgerEvent};
use crate::palette::Palette;

/// Result of a command that went through.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Allocated {
        address: u64,
        size: u64,
        strategy: FitStrategy,
    },
    Deallocated {
        address: u64,
    },
    StrategySelected(FitStrategy),
    Reset,
    Map,
    Stats,
    Help,
    Quit,
}

/// Text front end around one ledger. Requests are handled one at
/// a time, and a rejected request is reported without ending the
/// session.
pub struct Session {
    ledger: BlockLedger,
    strategy: FitStrategy,
    palette: Rc<RefCell<Palette>>,
}

impl Session {
    pub fn new(config: &Config) -> Result<Self> {
        let mut ledger = BlockLedger::new(config.memory_size)?;

        // The palette only learns about owners through ledger
        // events.
        let palette = Rc::new(RefCell::new(Palette::new()));
        let observer = Rc::clone(&palette);
        ledger.subscribe(move |event: &LedgerEvent| observer.borrow_mut().observe(event));

        info!(
            "Session started: {} units, {}.",
            config.memory_size, config.strategy
        );

        Ok(Self {
            ledger,
            strategy: config.strategy,
            palette,
        })
    }

    pub fn ledger(&self) -> &BlockLedger {
        &self.ledger
    }

    pub fn strategy(&self) -> FitStrategy {
        self.strategy
    }

    pub fn palette(&self) -> Ref<'_, Palette> {
        self.palette.borrow()
    }

    /// Applies a command to the ledger.
    pub fn apply(&mut self, command: Command) -> Result<Outcome, CommandError> {
        let outcome = match command {
            Command::Allocate { size, owner } => {
                let address = self
                    .ledger
                    .allocate(size, owner.as_deref(), self.strategy)?;
                Outcome::Allocated {
                    address,
                    size,
                    strategy: self.strategy,
                }
            }
            Command::Deallocate { address } => {
                self.ledger.deallocate(address)?;
                Outcome::Deallocated { address }
            }
            Command::Strategy(strategy) => {
                // Switching strategy leaves the next-fit cursor
                // where it is.
                self.strategy = strategy;
                Outcome::StrategySelected(strategy)
            }
            Command::Reset => {
                self.ledger.reset();
                Outcome::Reset
            }
            Command::Map => Outcome::Map,
            Command::Stats => Outcome::Stats,
            Command::Help => Outcome::Help,
            Command::Quit => Outcome::Quit,
        };

        Ok(outcome)
    }

    /// Reads commands line by line until `quit` or the end of the
    /// input. Only I/O errors end the session early.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> Result<()> {
        for line in input.lines() {
            let line = line?;

            let result = Command::parse_line(&line)
                .and_then(|command| command.map(|c| self.apply(c)).transpose());

            match result {
                Ok(Some(Outcome::Quit)) => break,
                Ok(Some(outcome)) => self.render(&outcome, &mut output)?,
                Ok(None) => (),
                Err(error) => {
                    warn!("{}: {error}", line.trim());
                    writeln!(output, "error: {error}")?;
                }
            }
        }

        output.flush()?;
        Ok(())
    }

    /// Writes the user-facing description of an outcome.
    pub fn render<W: Write>(&self, outcome: &Outcome, output: &mut W) -> Result<()> {
        match outcome {
            Outcome::Allocated {
                address,
                size,
                strategy,
            } => writeln!(output, "Allocated {size} at address {address} ({strategy}).")?,
            Outcome::Deallocated { address } => {
                writeln!(output, "Deallocated block at address {address}.")?
            }
            Outcome::StrategySelected(strategy) => writeln!(output, "Current: {strategy}")?,
            Outcome::Reset => writeln!(
                output,
                "Memory reset: one free block of {}.",
                self.ledger.total_size()
            )?,
            Outcome::Map => self.render_map(output)?,
            Outcome::Stats => writeln!(output, "{}", self.ledger.stats())?,
            Outcome::Help => writeln!(output, "{HELP}")?,
            Outcome::Quit => (),
        }
        Ok(())
    }

    fn render_map<W: Write>(&self, output: &mut W) -> Result<()> {
        // The memory map table, with the colour each block is
        // drawn with appended to its row.
        let palette = self.palette();
        let map = self.ledger.memory_map().to_string();
        let mut rows = map.lines();
        if let Some(header) = rows.next() {
            writeln!(output, "{header}\tColour")?;
        }
        for (row, block) in rows.zip(self.ledger.blocks()) {
            let color = palette.block_color(block.allocated, block.owner.as_deref());
            writeln!(output, "{row}\t{color}")?;
        }

        let isolated: Vec<String> = self
            .ledger
            .blocks()
            .iter()
            .enumerate()
            .filter(|(index, _)| self.ledger.is_externally_fragmented(*index))
            .map(|(_, block)| block.start_address.to_string())
            .collect();
        if !isolated.is_empty() {
            writeln!(output, "Isolated free blocks at: {}", isolated.join(", "))?;
        }

        for (owner, color) in palette.legend() {
            writeln!(output, "Owner {owner}: {color}")?;
        }
        Ok(())
    }
}
