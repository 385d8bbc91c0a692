//! Permutation helpers: validity, random construction, transposition moves.

use rand::seq::SliceRandom;
use rand::Rng;

/// Returns `true` if `perm` contains every integer in `[0, perm.len())` exactly once.
pub fn is_permutation(perm: &[usize]) -> bool {
    let mut seen = vec![false; perm.len()];
    for &v in perm {
        if v >= perm.len() || seen[v] {
            return false;
        }
        seen[v] = true;
    }
    true
}

/// The identity permutation `[0, 1, ..., n-1]`.
pub fn identity(n: usize) -> Vec<usize> {
    (0..n).collect()
}

/// A uniformly random permutation of `[0, n)` (Fisher-Yates shuffle).
pub fn random_permutation<R: Rng>(n: usize, rng: &mut R) -> Vec<usize> {
    let mut perm = identity(n);
    perm.shuffle(rng);
    perm
}

/// Two distinct positions in `[0, n)`, uniform over unordered pairs.
///
/// Returns `None` when `n < 2`.
pub fn random_transposition<R: Rng>(n: usize, rng: &mut R) -> Option<(usize, usize)> {
    if n < 2 {
        return None;
    }
    let r = rng.random_range(0..n);
    let mut s = rng.random_range(0..n - 1);
    if s >= r {
        s += 1;
    }
    Some((r, s))
}

/// A copy of `perm` with one random transposition applied.
///
/// For `perm.len() < 2` the copy is returned unchanged.
pub fn transposition_neighbor<R: Rng>(perm: &[usize], rng: &mut R) -> Vec<usize> {
    let mut next = perm.to_vec();
    if let Some((r, s)) = random_transposition(perm.len(), rng) {
        next.swap(r, s);
    }
    next
}
