//! neuro-normalize
//!
//! Turns heterogeneous score-export rows into canonical `ScoreRecord`s,
//! derives missing z-scores, percentiles and qualitative ranges, and
//! aggregates z statistics per domain, subdomain and narrow category.
//! Pure over its input apart from [`raw::read_rows`].

pub mod error;
pub mod normalize;
pub mod raw;
pub mod stats;

pub use normalize::{BatchReport, NormalizeOutput, RowWarning, derive_statistics, normalize, renormalize};
pub use raw::{RawRow, read_rows};
pub use stats::{compute_group, group_statistics};
