use std::collections::BTreeMap;

use neuro_core::models::score::ScoreRecord;
use neuro_core::models::stats::{DomainGroupStats, GroupKey};

/// Group the scoreable records by domain, by domain + subdomain, and by
/// domain + subdomain + narrow category, and compute z statistics for each
/// non-empty group. Output is ordered by key.
pub fn group_statistics(records: &[ScoreRecord]) -> Vec<DomainGroupStats> {
    let mut groups: BTreeMap<GroupKey, Vec<&ScoreRecord>> = BTreeMap::new();

    for record in records.iter().filter(|r| r.is_scoreable()) {
        groups
            .entry(GroupKey::domain(&record.domain))
            .or_default()
            .push(record);

        if let Some(subdomain) = &record.subdomain {
            groups
                .entry(GroupKey::subdomain(&record.domain, subdomain))
                .or_default()
                .push(record);
        }

        if let Some(narrow) = &record.narrow_category {
            groups
                .entry(GroupKey::narrow_category(
                    &record.domain,
                    record.subdomain.clone(),
                    narrow,
                ))
                .or_default()
                .push(record);
        }
    }

    groups
        .into_iter()
        .map(|(key, members)| compute_group(key, members))
        .collect()
}

/// Statistics for one group. Unscoreable members are ignored; absent or
/// non-finite z values do not contribute to the mean or SD.
pub fn compute_group<'a>(
    key: GroupKey,
    members: impl IntoIterator<Item = &'a ScoreRecord>,
) -> DomainGroupStats {
    let mut n = 0;
    let mut zs = Vec::new();
    for record in members.into_iter().filter(|r| r.is_scoreable()) {
        n += 1;
        if let Some(z) = record.z.filter(|z| z.is_finite()) {
            zs.push(z);
        }
    }

    let mean_z = mean(&zs);
    let sd_z = mean_z.and_then(|m| sample_sd(&zs, m));

    DomainGroupStats {
        key,
        n,
        z_count: zs.len(),
        mean_z,
        sd_z,
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

fn sample_sd(values: &[f64], mean: f64) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    Some((ss / (values.len() - 1) as f64).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_sd_matches_hand_computation() {
        let values = [1.0, 2.0, 3.0, 4.0];
        let m = mean(&values).unwrap();
        assert_eq!(m, 2.5);
        let sd = sample_sd(&values, m).unwrap();
        assert!((sd - 1.290_994_4).abs() < 1e-6);
    }

    #[test]
    fn empty_group_has_no_mean() {
        let stats = compute_group(GroupKey::domain("Memory"), std::iter::empty());
        assert_eq!(stats.n, 0);
        assert_eq!(stats.mean_z, None);
        assert_eq!(stats.sd_z, None);
    }
}
