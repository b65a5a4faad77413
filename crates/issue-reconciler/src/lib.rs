//! Branch-scoped historical issue reconciliation (spec §4.3).
//!
//! Three steps, run in order by `reconcile_issues`: gather the still-open
//! issues touched by the current diff's changed files and filter them to
//! this branch (`gather`), ask the AI about all of them in one call
//! (`reconcile`), and apply the verdicts back without ever un-resolving an
//! already-resolved issue (`apply`).

pub mod apply;
pub mod gather;
pub mod reconcile;

pub use gather::{Candidate, gather_candidates};
pub use reconcile::{ReconcileOutcome, reconcile_candidates, reconcile_issues};
