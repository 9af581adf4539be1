//! Enumeration of location combinations.
//!
//! Every non-empty subset of the location keys gets its own output calendar.
//! Subsets are produced by doubling: each new key is emitted alone, then
//! appended to every subset that existed before the key was reached.

/// Returns every non-empty subset of `keys`, each exactly once.
///
/// Members keep their relative order from `keys`. For `["a", "b", "c"]` the
/// result is `[a] [b] [a,b] [c] [a,c] [b,c] [a,b,c]`.
///
/// The output has `2^N - 1` entries, so callers should keep `N` small.
pub fn generate_subsets<T: Clone>(keys: &[T]) -> Vec<Vec<T>> {
    let mut subsets: Vec<Vec<T>> = Vec::new();

    for key in keys {
        // Only subsets that existed before this key; the ones pushed below
        // already contain it.
        let existing = subsets.len();
        subsets.push(vec![key.clone()]);

        for i in 0..existing {
            let mut subset = Vec::with_capacity(subsets[i].len() + 1);
            subset.extend_from_slice(&subsets[i]);
            subset.push(key.clone());
            subsets.push(subset);
        }
    }

    subsets
}

/// Returns `2^n - 1`, or `None` if it does not fit in a `usize`.
pub fn subset_count(n: usize) -> Option<usize> {
    let shift = u32::try_from(n).ok()?;
    1usize.checked_shl(shift).map(|total| total - 1)
}
