//! neuro-domains
//!
//! The catalogue of clinical domains a report can contain, the per-domain
//! evidence rules, and the validator deciding which domains have enough
//! usable data to appear in the report.

pub mod catalogue;
pub mod error;
pub mod rule;
pub mod select;
pub mod validate;

pub use catalogue::{DomainConfig, DomainKind, PatientType, catalogue};
pub use rule::{DomainRule, RuleSet};
pub use select::{DomainSelection, select_domains};
pub use validate::validate_domain;
