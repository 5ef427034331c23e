//! Weight-map helpers shared by weighted and quadratic tallies.

use tally_core::ballot::{parse_choice_key, ChoiceIndex, WeightMap};

use super::{in_range, slot};
use crate::Rejection;

/// Common validity for weight maps: non-empty, every key an in-range integer,
/// every weight accepted by `weight_ok` (else `reject(choice)`).
pub(crate) fn check_weight_map(
    selection: &WeightMap,
    choice_count: usize,
    weight_ok: fn(i64) -> bool,
    reject: fn(ChoiceIndex) -> Rejection,
) -> Result<(), Rejection> {
    if selection.is_empty() {
        return Err(Rejection::EmptySelection);
    }
    for (key, weight) in selection.iter() {
        let choice = parse_choice_key(key).map_err(|_| Rejection::BadKey(key.to_string()))?;
        if !in_range(choice, choice_count) {
            return Err(Rejection::OutOfRange(choice));
        }
        if !weight_ok(weight) {
            return Err(reject(choice));
        }
    }
    Ok(())
}

/// `(slot, weight)` for every entry whose key parses and is in range.
/// Unparseable keys are logged and skipped; the rest of the vote still counts.
pub(crate) fn weighted_slots(selection: &WeightMap, choice_count: usize) -> Vec<(usize, f64)> {
    let mut out = Vec::with_capacity(selection.len());
    for (key, weight) in selection.iter() {
        match parse_choice_key(key) {
            Ok(choice) => {
                if let Some(i) = slot(choice, choice_count) {
                    out.push((i, weight as f64));
                }
            }
            Err(err) => {
                tracing::warn!(key, %err, "skipping weight entry");
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_map_rejected() {
        let err = check_weight_map(&WeightMap::new(), 3, |w| w >= 0, Rejection::NegativeWeight);
        assert_eq!(err, Err(Rejection::EmptySelection));
    }

    #[test]
    fn bad_key_and_range_rejected() {
        let mut m = WeightMap::new();
        m.insert("x", 1);
        assert_eq!(
            check_weight_map(&m, 3, |w| w >= 0, Rejection::NegativeWeight),
            Err(Rejection::BadKey("x".into()))
        );
        let m = WeightMap::from_pairs([(4, 1)]);
        assert_eq!(
            check_weight_map(&m, 3, |w| w >= 0, Rejection::NegativeWeight),
            Err(Rejection::OutOfRange(4))
        );
    }

    #[test]
    fn slots_skip_unparseable_keys() {
        let mut m = WeightMap::from_pairs([(1, 2), (3, 5)]);
        m.insert("oops", 7);
        assert_eq!(weighted_slots(&m, 3), vec![(0, 2.0), (2, 5.0)]);
    }
}
