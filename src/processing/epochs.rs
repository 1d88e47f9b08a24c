// src/processing/epochs.rs
//! Sub-epoch boundary expansion
//!
//! The task after the anchor is a baseline followed by alternating on/off
//! phases of equal length. Boundaries are for marking only and never feed
//! back into envelope or threshold stages.

use crate::config::EpochConfig;

/// `count` boundaries starting at `anchor_s`, `length_s` apart
pub fn epoch_boundaries(anchor_s: f64, length_s: f64, count: usize) -> Vec<f64> {
    (0..count).map(|i| anchor_s + length_s * i as f64).collect()
}

/// Boundaries for a re-anchored epoch using the configured layout
pub fn boundaries_from_config(anchor_s: f64, config: &EpochConfig) -> Vec<f64> {
    epoch_boundaries(anchor_s, config.sub_epoch_length_s, config.sub_epoch_count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout() {
        let boundaries = boundaries_from_config(10.0, &EpochConfig::default());
        assert_eq!(boundaries, vec![10.0, 20.0, 30.0, 40.0, 50.0, 60.0]);
    }

    #[test]
    fn test_zero_count() {
        assert!(epoch_boundaries(10.0, 10.0, 0).is_empty());
    }

    #[test]
    fn test_custom_length() {
        assert_eq!(epoch_boundaries(5.0, 2.5, 3), vec![5.0, 7.5, 10.0]);
    }
}
