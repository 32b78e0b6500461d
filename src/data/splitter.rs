// ============================================================
// Layer 4 — Train/Validation Splitter
// ============================================================
// Splits windowed samples into two sets:
//   - Training set:   used to update model weights
//   - Validation set: used to measure performance on unseen data
//
// Time-series caveat: adjacent windows overlap heavily, so a
// random split would leak near-duplicates of training windows
// into validation. The default here is therefore CHRONOLOGICAL —
// the validation set is the most recent tail of the data, which
// is also what live prediction will look like. A shuffled split
// (Fisher-Yates via rand::seq::SliceRandom) remains available
// for datasets whose rows are independent.
//
// Reference: rand crate documentation

use rand::seq::SliceRandom;

/// Split `samples` into (train, validation).
///
/// `train_fraction` is the proportion kept for training, e.g. 0.8.
/// With `shuffle` false the order is preserved and validation is the
/// chronological tail; with `shuffle` true the samples are permuted
/// first.
pub fn split_train_val<T>(
    mut samples:    Vec<T>,
    train_fraction: f64,
    shuffle:        bool,
) -> (Vec<T>, Vec<T>) {
    if shuffle {
        let mut rng = rand::thread_rng();
        samples.shuffle(&mut rng);
    }

    let total    = samples.len();
    let split_at = ((total as f64) * train_fraction).round() as usize;
    // Clamp to valid range to avoid panics on tiny datasets
    let split_at = split_at.min(total);

    // split_off(n) removes elements [n..] from the Vec and returns them
    let val = samples.split_off(split_at);

    tracing::debug!(
        "Dataset split: {} training, {} validation ({}% / {}%)",
        samples.len(),
        val.len(),
        (samples.len() * 100) / total.max(1),
        (val.len()     * 100) / total.max(1),
    );

    (samples, val)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_correct_split_sizes() {
        let items: Vec<usize> = (0..100).collect();
        let (train, val)      = split_train_val(items, 0.8, false);
        assert_eq!(train.len(), 80);
        assert_eq!(val.len(),   20);
    }

    #[test]
    fn test_chronological_split_keeps_tail_for_validation() {
        let items: Vec<usize> = (0..10).collect();
        let (train, val)      = split_train_val(items, 0.7, false);
        assert_eq!(train, vec![0, 1, 2, 3, 4, 5, 6]);
        assert_eq!(val,   vec![7, 8, 9]);
    }

    #[test]
    fn test_all_items_preserved_when_shuffled() {
        let items: Vec<usize> = (0..50).collect();
        let (mut train, val)  = split_train_val(items, 0.7, true);
        train.extend(val);
        train.sort_unstable();
        assert_eq!(train, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn test_empty_dataset() {
        let items: Vec<usize> = Vec::new();
        let (train, val)      = split_train_val(items, 0.8, false);
        assert!(train.is_empty());
        assert!(val.is_empty());
    }

    #[test]
    fn test_full_training_split() {
        let items: Vec<usize> = (0..10).collect();
        let (train, val)      = split_train_val(items, 1.0, false);
        assert_eq!(train.len(), 10);
        assert!(val.is_empty());
    }
}
