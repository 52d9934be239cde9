//! `sanad-core` -- PV design compliance rule engine.
//!
//! Pure logic, no I/O. Callers hand in the site context and the signals
//! extracted from the BoM, the single line diagram and the AC cable sizing
//! sheet; the engine returns a [`finding::ComplianceReport`] with one finding
//! per check in a fixed order.

pub mod checks;
pub mod engine;
pub mod error;
pub mod extraction;
pub mod finding;
pub mod signals;
pub mod site;
pub mod snapshot;
pub mod summary;
pub mod thresholds;
