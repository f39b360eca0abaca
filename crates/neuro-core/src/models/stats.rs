use serde::{Deserialize, Serialize};

/// Which level of the domain hierarchy a group was formed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupLevel {
    Domain,
    Subdomain,
    NarrowCategory,
}

/// Key of one group: the domain plus, depending on level, the subdomain and
/// narrow category beneath it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GroupKey {
    pub level: GroupLevel,
    pub domain: String,
    pub subdomain: Option<String>,
    pub narrow_category: Option<String>,
}

impl GroupKey {
    pub fn domain(domain: impl Into<String>) -> Self {
        Self {
            level: GroupLevel::Domain,
            domain: domain.into(),
            subdomain: None,
            narrow_category: None,
        }
    }

    pub fn subdomain(domain: impl Into<String>, subdomain: impl Into<String>) -> Self {
        Self {
            level: GroupLevel::Subdomain,
            domain: domain.into(),
            subdomain: Some(subdomain.into()),
            narrow_category: None,
        }
    }

    pub fn narrow_category(
        domain: impl Into<String>,
        subdomain: Option<String>,
        narrow_category: impl Into<String>,
    ) -> Self {
        Self {
            level: GroupLevel::NarrowCategory,
            domain: domain.into(),
            subdomain,
            narrow_category: Some(narrow_category.into()),
        }
    }
}

/// Aggregate over all scoreable records sharing a [`GroupKey`].
///
/// Always rebuilt from the full record set, never updated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainGroupStats {
    pub key: GroupKey,
    /// Scoreable records in the group.
    pub n: usize,
    /// Records in the group that carried a z value.
    pub z_count: usize,
    /// `None` when no record in the group has a z value.
    pub mean_z: Option<f64>,
    /// Sample standard deviation; `None` when fewer than two z values.
    pub sd_z: Option<f64>,
}
