//! Rental rate table for rented fleets
//!
//! Rates are configured as prefixed key/value pairs such as `RENT_PLANET_EATER = 10`,
//! meaning the fleet "Planet Eater" costs 10 ATLAS per 24 hours. The table is built
//! once per run and is read-only afterwards.

use std::collections::HashMap;
use tracing::warn;

use crate::constants;

/// Normalized fleet name -> ATLAS per 24h
#[derive(Debug, Clone, Default)]
pub struct RentalRateTable {
    rates: HashMap<String, f64>,
    exclusions: Vec<String>,
}

impl RentalRateTable {
    /// Build the table from configuration pairs. Keys without `prefix` are ignored,
    /// values that do not parse as a finite number are skipped with a warning.
    ///
    /// A fleet whose name contains any of `exclusions` is never rented.
    pub fn from_pairs<I, K, V>(prefix: &str, exclusions: &[String], pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut rates = HashMap::new();

        for (key, value) in pairs {
            let key = key.as_ref();
            let Some(suffix) = key.strip_prefix(prefix) else {
                continue;
            };

            let name = normalize_key(suffix);
            if name.is_empty() {
                warn!("Ignoring rental key '{}' with no fleet name", key);
                continue;
            }

            match value.as_ref().trim().parse::<f64>() {
                Ok(rate) if rate.is_finite() => {
                    rates.insert(name, rate);
                }
                _ => warn!("Ignoring rental key '{}': '{}' is not a number", key, value.as_ref()),
            }
        }

        let exclusions = exclusions
            .iter()
            .map(|e| normalize_name(e))
            .filter(|e| !e.is_empty())
            .collect();

        Self { rates, exclusions }
    }

    /// Configured rate for a fleet, or None if it is not rented.
    /// Matching ignores case and surrounding/repeated whitespace.
    pub fn lookup(&self, fleet_name: &str) -> Option<f64> {
        let name = normalize_name(fleet_name);
        if self.is_excluded(&name) {
            return None;
        }
        self.rates.get(&name).copied()
    }

    fn is_excluded(&self, normalized: &str) -> bool {
        self.exclusions.iter().any(|e| normalized.contains(e.as_str()))
    }

    /// All configured rates sorted by fleet name
    pub fn entries(&self) -> Vec<(&str, f64)> {
        let mut entries: Vec<_> = self.rates.iter().map(|(k, v)| (k.as_str(), *v)).collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

/// "PLANET_EATER" -> "planet eater"
fn normalize_key(suffix: &str) -> String {
    suffix
        .split(constants::RENTAL_KEY_DELIMITER)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// " Planet   Eater " -> "planet eater"
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(pairs: &[(&str, &str)], exclusions: &[&str]) -> RentalRateTable {
        let exclusions: Vec<String> = exclusions.iter().map(|s| s.to_string()).collect();
        RentalRateTable::from_pairs("RENT_", &exclusions, pairs.iter().copied())
    }

    #[test]
    fn test_key_normalization() {
        let rates = table(&[("RENT_PLANET_EATER", "10"), ("RENT_Big__Dipper", "2.5")], &[]);
        assert_eq!(rates.len(), 2);
        assert_eq!(rates.entries(), vec![("big dipper", 2.5), ("planet eater", 10.0)]);
    }

    #[test]
    fn test_lookup_ignores_case_and_whitespace() {
        let rates = table(&[("RENT_PLANET_EATER", "10")], &[]);
        assert_eq!(rates.lookup("Planet Eater"), Some(10.0));
        assert_eq!(rates.lookup("planet eater"), Some(10.0));
        assert_eq!(rates.lookup(" planet   eater "), Some(10.0));
        assert_eq!(rates.lookup("PLANET EATER"), Some(10.0));
    }

    #[test]
    fn test_unmatched_fleet_is_not_rented() {
        let rates = table(&[("RENT_PLANET_EATER", "10")], &[]);
        assert_eq!(rates.lookup("Star Hopper"), None);
        assert_eq!(rates.lookup(""), None);
    }

    #[test]
    fn test_keys_without_prefix_are_ignored() {
        let rates = table(&[("PATH", "/usr/bin"), ("RENTAL", "5"), ("RENT_ALPHA", "1")], &[]);
        assert_eq!(rates.len(), 1);
        assert_eq!(rates.lookup("alpha"), Some(1.0));
    }

    #[test]
    fn test_unparseable_values_are_skipped() {
        let rates = table(&[("RENT_ALPHA", "ten"), ("RENT_BETA", " 3 "), ("RENT_", "4")], &[]);
        assert_eq!(rates.lookup("alpha"), None);
        assert_eq!(rates.lookup("beta"), Some(3.0));
        assert_eq!(rates.len(), 1);
    }

    #[test]
    fn test_zero_and_negative_rates_are_kept() {
        // Classification treats these as owned; the table only stores them
        let rates = table(&[("RENT_ALPHA", "0"), ("RENT_BETA", "-1")], &[]);
        assert_eq!(rates.lookup("alpha"), Some(0.0));
        assert_eq!(rates.lookup("beta"), Some(-1.0));
    }

    #[test]
    fn test_exclusion_overrides_configured_rate() {
        let rates = table(&[("RENT_ESCAPE_POD_ONE", "7"), ("RENT_ALPHA", "1")], &["Escape Pod"]);
        assert_eq!(rates.lookup("Escape Pod One"), None);
        assert_eq!(rates.lookup("my escape  pod one"), None);
        assert_eq!(rates.lookup("Alpha"), Some(1.0));
    }
}
