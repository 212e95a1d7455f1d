//! Weighted sampling over `(item, weight, eligible)` entries.

use rand::Rng;

use crate::error::EngineError;

/// A sampling entry. Ineligible entries keep their slot but never win a draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightedEntry<T> {
    pub item: T,
    pub weight: f64,
    pub eligible: bool,
}

impl<T> WeightedEntry<T> {
    pub fn new(item: T, weight: f64, eligible: bool) -> Self {
        Self {
            item,
            weight,
            eligible,
        }
    }
}

/// Returns `(index, probability)` for each eligible entry with positive weight.
///
/// Probabilities sum to one. Fails with `InvalidInput` if any weight (eligible or not) is negative
/// or non-finite, and with `EligibilitySetEmpty` if no eligible entry carries weight.
pub fn normalized_weights<T>(entries: &[WeightedEntry<T>]) -> Result<Vec<(usize, f64)>, EngineError> {
    let mut total = 0.0_f64;
    for (idx, entry) in entries.iter().enumerate() {
        if !entry.weight.is_finite() || entry.weight < 0.0 {
            return Err(EngineError::invalid(format!(
                "entry {idx} has weight {} (must be finite and non-negative)",
                entry.weight
            )));
        }
        if entry.eligible {
            total += entry.weight;
        }
    }

    if total <= 0.0 {
        return Err(EngineError::EligibilitySetEmpty);
    }

    Ok(entries
        .iter()
        .enumerate()
        .filter(|(_, entry)| entry.eligible && entry.weight > 0.0)
        .map(|(idx, entry)| (idx, entry.weight / total))
        .collect())
}

/// Draws the index of one eligible entry, proportional to its normalized weight.
pub fn sample_index<T, R: Rng + ?Sized>(
    entries: &[WeightedEntry<T>],
    rng: &mut R,
) -> Result<usize, EngineError> {
    let normalized = normalized_weights(entries)?;
    let draw = rng.gen_range(0.0..1.0_f64);

    let mut cumulative = 0.0_f64;
    for &(idx, probability) in &normalized {
        cumulative += probability;
        if draw < cumulative {
            return Ok(idx);
        }
    }

    // Rounding can leave the final cumulative weight a hair under 1.0.
    normalized
        .last()
        .map(|&(idx, _)| idx)
        .ok_or(EngineError::EligibilitySetEmpty)
}

/// Draws one eligible item, proportional to its normalized weight.
pub fn sample_weighted<'a, T, R: Rng + ?Sized>(
    entries: &'a [WeightedEntry<T>],
    rng: &mut R,
) -> Result<&'a T, EngineError> {
    let idx = sample_index(entries, rng)?;
    Ok(&entries[idx].item)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn normalization_sums_to_one() {
        let entries = [
            WeightedEntry::new("a", 2.0, true),
            WeightedEntry::new("b", 6.0, true),
            WeightedEntry::new("c", 100.0, false),
        ];
        let normalized = normalized_weights(&entries).expect("eligible weight present");
        assert_eq!(normalized.len(), 2);
        assert!((normalized[0].1 - 0.25).abs() < 1e-12);
        assert!((normalized[1].1 - 0.75).abs() < 1e-12);
    }

    #[test]
    fn ineligible_entries_are_never_drawn() {
        let entries = [
            WeightedEntry::new("heavy", 0.99, false),
            WeightedEntry::new("light", 0.01, true),
        ];
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            assert_eq!(*sample_weighted(&entries, &mut rng).unwrap(), "light");
        }
    }

    #[test]
    fn zero_weight_entry_is_never_drawn() {
        let entries = [
            WeightedEntry::new(0, 0.0, true),
            WeightedEntry::new(1, 1.0, true),
        ];
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..500 {
            assert_eq!(sample_index(&entries, &mut rng).unwrap(), 1);
        }
    }

    #[test]
    fn empty_eligible_set_is_reported() {
        let entries = [WeightedEntry::new("a", 0.5, false)];
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(
            sample_index(&entries, &mut rng),
            Err(EngineError::EligibilitySetEmpty)
        );

        let none: [WeightedEntry<&str>; 0] = [];
        assert_eq!(
            sample_index(&none, &mut rng),
            Err(EngineError::EligibilitySetEmpty)
        );
    }

    #[test]
    fn negative_or_nan_weight_is_invalid_input() {
        let mut rng = StdRng::seed_from_u64(1);
        let negative = [WeightedEntry::new("a", -0.1, true)];
        assert!(matches!(
            sample_index(&negative, &mut rng),
            Err(EngineError::InvalidInput { .. })
        ));

        let nan = [
            WeightedEntry::new("a", 1.0, true),
            WeightedEntry::new("b", f64::NAN, false),
        ];
        assert!(matches!(
            sample_index(&nan, &mut rng),
            Err(EngineError::InvalidInput { .. })
        ));
    }

    #[test]
    fn seeded_draws_are_reproducible() {
        let entries = [
            WeightedEntry::new('x', 0.3, true),
            WeightedEntry::new('y', 0.3, true),
            WeightedEntry::new('z', 0.4, true),
        ];
        let mut rng_a = StdRng::seed_from_u64(99);
        let mut rng_b = StdRng::seed_from_u64(99);
        let draws_a: Vec<usize> = (0..64)
            .map(|_| sample_index(&entries, &mut rng_a).unwrap())
            .collect();
        let draws_b: Vec<usize> = (0..64)
            .map(|_| sample_index(&entries, &mut rng_b).unwrap())
            .collect();
        assert_eq!(draws_a, draws_b);
    }
}
