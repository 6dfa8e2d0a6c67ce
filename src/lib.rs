//! Simulation of dynamic memory allocation over a single linear
//! address space.
//!
//! [`core::allocator::BlockLedger`] holds the blocks and runs the
//! allocation strategies. Everything else in the crate is a text
//! front end that drives a ledger and prints its state.

pub mod command;
pub mod config;
pub mod core;
pub mod palette;
pub mod session;
