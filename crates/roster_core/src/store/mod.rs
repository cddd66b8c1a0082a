//! Roster state held for display.
//!
//! # Invariants
//! - The store is the only holder of displayed teams; edit sessions work
//!   on clones and never write into it directly.

pub mod roster_store;
