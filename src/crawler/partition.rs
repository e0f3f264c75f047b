//! Static partitioning of the link set across workers

use std::time::Duration;

/// Splits items into `workers` disjoint slices by index modulo `workers`
///
/// Every item lands in exactly one slice. A worker count of zero is treated
/// as one.
///
/// # Examples
///
/// ```
/// use lexicon_ripple::crawler::partition;
///
/// let slices = partition(vec![1, 2, 3, 4, 5], 2);
/// assert_eq!(slices, vec![vec![1, 3, 5], vec![2, 4]]);
/// ```
pub fn partition<T>(items: Vec<T>, workers: usize) -> Vec<Vec<T>> {
    let workers = workers.max(1);
    let mut slices: Vec<Vec<T>> = (0..workers).map(|_| Vec::new()).collect();

    for (i, item) in items.into_iter().enumerate() {
        slices[i % workers].push(item);
    }

    slices
}

/// Estimates the time left as `elapsed * remaining / done`
pub fn estimate_remaining(elapsed: Duration, done: usize, total: usize) -> Duration {
    if done == 0 || done >= total {
        return Duration::ZERO;
    }

    elapsed.mul_f64((total - done) as f64 / done as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_partition_covers_and_is_disjoint() {
        for len in [0usize, 1, 2, 7, 100, 101] {
            for workers in [1usize, 2, 3, 8, 150] {
                let items: Vec<usize> = (0..len).collect();
                let slices = partition(items, workers);
                assert_eq!(slices.len(), workers);

                let mut seen = BTreeSet::new();
                for slice in &slices {
                    for item in slice {
                        assert!(seen.insert(*item), "item {} in two slices", item);
                    }
                }
                assert_eq!(seen, (0..len).collect::<BTreeSet<_>>());
            }
        }
    }

    #[test]
    fn test_partition_is_balanced() {
        let slices = partition((0..10).collect::<Vec<_>>(), 3);
        let sizes: Vec<usize> = slices.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![4, 3, 3]);
    }

    #[test]
    fn test_zero_workers_means_one() {
        let slices = partition(vec!["a", "b"], 0);
        assert_eq!(slices, vec![vec!["a", "b"]]);
    }

    #[test]
    fn test_estimate_remaining() {
        let eta = estimate_remaining(Duration::from_secs(10), 100, 300);
        assert_eq!(eta, Duration::from_secs(20));
        assert_eq!(estimate_remaining(Duration::from_secs(10), 0, 300), Duration::ZERO);
        assert_eq!(estimate_remaining(Duration::from_secs(10), 300, 300), Duration::ZERO);
    }
}
