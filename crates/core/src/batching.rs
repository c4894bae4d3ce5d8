//! Batch construction under the transport's multicast limit.

/// Maximum number of endpoints the transport accepts in one multicast call.
pub const BATCH_LIMIT: usize = 500;

/// Split `items` into consecutive batches of at most `size` elements.
///
/// Empty input yields no batches. Only the last batch may be shorter than
/// `size`, and concatenating the batches gives back `items` in order. A `size`
/// of zero is treated as one.
pub fn chunk<T>(items: &[T], size: usize) -> Vec<&[T]> {
    items.chunks(size.max(1)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_yields_no_batches() {
        let items: Vec<u32> = Vec::new();
        assert!(chunk(&items, BATCH_LIMIT).is_empty());
    }

    #[test]
    fn batch_sizes_and_order_are_preserved() {
        for n in [1usize, 499, 500, 501, 1000, 1001, 1499] {
            let items: Vec<usize> = (0..n).collect();
            let batches = chunk(&items, BATCH_LIMIT);

            assert_eq!(batches.len(), n.div_ceil(BATCH_LIMIT), "n = {n}");
            assert!(batches.iter().all(|b| !b.is_empty() && b.len() <= BATCH_LIMIT));

            let rejoined: Vec<usize> = batches.concat();
            assert_eq!(rejoined, items);
        }
    }

    #[test]
    fn only_the_last_batch_is_short() {
        let items: Vec<u32> = (0..1203).collect();
        let batches = chunk(&items, BATCH_LIMIT);
        assert_eq!(
            batches.iter().map(|b| b.len()).collect::<Vec<_>>(),
            vec![500, 500, 203]
        );
    }

    #[test]
    fn zero_size_behaves_like_one() {
        let items = ["a", "b", "c"];
        let batches = chunk(&items, 0);
        assert_eq!(batches.len(), 3);
    }
}
