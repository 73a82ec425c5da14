//! Content fingerprints for sample histories.

use sha2::{Digest, Sha256};

use super::sample::{sort_by_date, DailySample};

/// Fingerprint of a sample history, independent of the order samples were
/// supplied in.
///
/// Each sample is hashed as `date` followed by its `indicator=value` pairs in
/// indicator order, so two histories with the same content always match.
pub fn fingerprint_samples(samples: &[DailySample]) -> String {
    let mut ordered = samples.to_vec();
    sort_by_date(&mut ordered);

    let mut hasher = Sha256::new();
    for sample in &ordered {
        hasher.update(sample.date.to_string().as_bytes());
        for (indicator, value) in &sample.values {
            hasher.update(format!("|{}={}", indicator, value).as_bytes());
        }
        hasher.update(b"\n");
    }
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Indicator;
    use chrono::NaiveDate;

    fn sample(d: u32, v: i32) -> DailySample {
        DailySample::new(NaiveDate::from_ymd_opt(2024, 1, d).unwrap())
            .with_value(Indicator::Mental, v)
    }

    #[test]
    fn test_fingerprint_is_hex_sha256() {
        let fingerprint = fingerprint_samples(&[sample(1, 3)]);
        assert_eq!(fingerprint.len(), 64);
        assert!(fingerprint.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_fingerprint_ignores_input_order() {
        let a = vec![sample(1, 3), sample(2, 4), sample(3, 5)];
        let b = vec![sample(3, 5), sample(1, 3), sample(2, 4)];
        assert_eq!(fingerprint_samples(&a), fingerprint_samples(&b));
    }

    #[test]
    fn test_fingerprint_changes_with_values() {
        let a = vec![sample(1, 3), sample(2, 4)];
        let b = vec![sample(1, 3), sample(2, 5)];
        assert_ne!(fingerprint_samples(&a), fingerprint_samples(&b));
        assert_ne!(fingerprint_samples(&a), fingerprint_samples(&[]));
    }
}
