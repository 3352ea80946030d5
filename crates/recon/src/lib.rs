//! `payrecon-recon`: two-ledger reconciliation engine.
//!
//! Pure engine crate: receives loaded tables, returns partitions and counts.
//! No file IO; loading and artifact rendering live in `payrecon-io`.

pub mod engine;
pub mod error;
pub mod keys;
pub mod matcher;
pub mod model;
pub mod normalize;
pub mod summary;

pub use engine::{reconcile, Reconciliation};
pub use error::ReconError;
pub use keys::{select_keys, KeyPair, ReconMode};
pub use matcher::{match_tables, MatchResult};
pub use model::{Cell, Side, Table};
pub use normalize::normalize;
pub use summary::Summary;
