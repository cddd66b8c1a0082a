//! Use-case services over store, session and remote.
//!
//! # Responsibility
//! - Keep staging rules, candidate computation and commit orchestration
//!   out of the store and remote layers.
//! - Offer one controller facade to dashboard callers.

pub mod candidates;
pub mod edit_session;
pub mod history_service;
pub mod roster_controller;
