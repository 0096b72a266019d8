//! Merge-based intersection of two ascending sequences

/// Intersect two ascending sequences with a two-pointer merge
///
/// Both inputs must already be sorted; nothing is re-sorted or de-duplicated.
/// On a match both cursors advance, so a value repeated `m` times in `a` and
/// `n` times in `b` appears `min(m, n)` times in the output. Runs in
/// `O(a.len() + b.len())`.
pub fn intersect<T: Ord + Clone>(a: &[T], b: &[T]) -> Vec<T> {
    let mut out = Vec::new();
    let (mut i, mut j) = (0, 0);

    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Equal => {
                out.push(a[i].clone());
                i += 1;
                j += 1;
            }
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, Rng, SeedableRng};
    use std::collections::BTreeSet;

    #[test]
    fn test_empty_inputs() {
        let b = vec![1, 2, 3];
        assert!(intersect(&[], &b).is_empty());
        assert!(intersect(&b, &[]).is_empty());
        assert!(intersect::<u8>(&[], &[]).is_empty());
    }

    #[test]
    fn test_disjoint() {
        assert!(intersect(&[1, 3, 5], &[2, 4, 6]).is_empty());
    }

    #[test]
    fn test_identical() {
        let a = vec!["aa", "bb", "cc"];
        assert_eq!(intersect(&a, &a), a);
    }

    #[test]
    fn test_partial_overlap() {
        assert_eq!(intersect(&["aa01", "bb02"], &["bb02", "cc03"]), vec!["bb02"]);
    }

    #[test]
    fn test_duplicates_matched_per_alignment() {
        assert_eq!(intersect(&[1, 2, 2, 2, 3], &[2, 2, 4]), vec![2, 2]);
        assert_eq!(intersect(&[7, 7], &[7]), vec![7]);
    }

    #[test]
    fn test_matches_set_intersection() {
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..50 {
            let a_set: BTreeSet<u16> =
                (0..rng.gen_range(0..200)).map(|_| rng.gen_range(0..500)).collect();
            let b_set: BTreeSet<u16> =
                (0..rng.gen_range(0..200)).map(|_| rng.gen_range(0..500)).collect();
            let expected: Vec<u16> = a_set.intersection(&b_set).copied().collect();

            let a: Vec<u16> = a_set.into_iter().collect();
            let b: Vec<u16> = b_set.into_iter().collect();

            assert_eq!(intersect(&a, &b), expected);
            assert_eq!(intersect(&a, &b), intersect(&b, &a));
        }
    }
}
