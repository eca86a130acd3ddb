//! Static checks run over a parsed workflow document.
//!
//! - `dispatch`: manual-dispatch schema extraction and submission checks
//! - `graph`: job graph schedulability
//! - `requirements`: job `runs-on` labels against online agent labels
//! - `evaluate`: combines the checks into one prioritized diagnostic

pub mod dispatch;
pub mod evaluate;
pub mod graph;
pub mod requirements;
