//! Gavel: a live lot-auction coordination engine.
//!
//! Many remote bidders race to raise the price on a single active lot while
//! an administrator controls lot activation and sale finalization. The
//! workspace splits the engine into its concerns:
//!
//! - [`types`] — lot/team aggregates, caller claims, events, error taxonomy
//! - [`engine`] — the bid ratchet, lifecycle transitions, bid admissibility
//! - [`store`] — the read / conditional-write / transaction storage contract
//! - [`settlement`] — atomic and saga sale finalization
//! - [`notifier`] — snapshot broadcast plus caller-directed rejections
//! - [`orchestrator`] — the command façade wiring the above together

pub use gavel_engine as engine;
pub use gavel_notifier as notifier;
pub use gavel_orchestrator as orchestrator;
pub use gavel_settlement as settlement;
pub use gavel_store as store;
pub use gavel_types as types;
