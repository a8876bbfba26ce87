//! Metro-area membership for the two-tier courier pricing.

use std::collections::BTreeSet;

/// Province names treated as the metro tier when no override is configured.
pub const DEFAULT_METRO_PROVINCES: [&str; 3] = ["NCR", "Metro Manila", "Kalakhang Maynila"];

/// Normalizes a province name for membership checks: lower-cased with all
/// whitespace removed, so `"  Metro Manila "` and `"metromanila"` compare equal.
#[must_use]
pub fn normalize_province(province: &str) -> String {
    province
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Fixed set of normalized province tokens priced at the metro rate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetroMembership {
    tokens: BTreeSet<String>,
}

impl MetroMembership {
    /// Builds a membership set, normalizing every name. Blank names are dropped.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tokens = names
            .into_iter()
            .map(|n| normalize_province(n.as_ref()))
            .filter(|t| !t.is_empty())
            .collect();
        Self { tokens }
    }

    #[must_use]
    pub fn contains(&self, province: &str) -> bool {
        self.tokens.contains(&normalize_province(province))
    }

    /// `true` when both ends of a shipment are inside the metro area.
    #[must_use]
    pub fn covers_route(&self, origin_province: &str, destination_province: &str) -> bool {
        self.contains(origin_province) && self.contains(destination_province)
    }

    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl Default for MetroMembership {
    fn default() -> Self {
        Self::from_names(DEFAULT_METRO_PROVINCES)
    }
}
