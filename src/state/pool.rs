//! Movie selection without repeats inside one pass over a pool

use rand::seq::IndexedRandom;
use rand::Rng;
use std::collections::HashSet;

/// Pick a random entry whose key has not been played yet and mark it played.
///
/// When every entry has been played the set is cleared and a new pass starts.
/// Returns `None` only for an empty pool.
pub fn pick_unplayed<'a, T, R, F>(
    pool: &'a [T],
    played: &mut HashSet<String>,
    key: F,
    rng: &mut R,
) -> Option<&'a T>
where
    R: Rng + ?Sized,
    F: Fn(&T) -> &str,
{
    let mut available: Vec<&T> = pool.iter().filter(|e| !played.contains(key(*e))).collect();

    if available.is_empty() {
        played.clear();
        available = pool.iter().collect();
    }

    let chosen = *available.choose(rng)?;
    played.insert(key(chosen).to_string());
    Some(chosen)
}
