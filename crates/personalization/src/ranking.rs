//! Ordering shared by every recommendation path.

use std::cmp::Ordering;

/// Higher count first. Used with a stable sort, so equal counts keep the
/// order in which the candidates were supplied.
pub fn by_count_desc<T>(a: &(T, u64), b: &(T, u64)) -> Ordering {
    b.1.cmp(&a.1)
}

/// Rank `(item, count)` pairs by count, highest first, ties in input order.
pub fn rank_by_count<T>(mut scored: Vec<(T, u64)>) -> Vec<T> {
    scored.sort_by(by_count_desc);
    scored.into_iter().map(|(item, _)| item).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_descending() {
        let ranked = rank_by_count(vec![("a", 1), ("b", 5), ("c", 3)]);
        assert_eq!(ranked, vec!["b", "c", "a"]);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let ranked = rank_by_count(vec![("x", 2), ("y", 7), ("z", 2), ("w", 2)]);
        assert_eq!(ranked, vec!["y", "x", "z", "w"]);
    }

    #[test]
    fn test_empty() {
        assert!(rank_by_count::<u8>(Vec::new()).is_empty());
    }
}
