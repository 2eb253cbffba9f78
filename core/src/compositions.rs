//! Integer compositions of a syllable count.
//!
//! A composition of `n` is an ordered list of positive parts summing to `n`;
//! the query engine reads each one as a way to cut the syllable buffer into
//! contiguous lookup groups. There are exactly `2^(n-1)` of them.
//!
//! Enumeration walks an `n - 1` bit mask from all ones down to zero. Bit `j`
//! set means position `j + 1` merges into the part before it, so the first
//! composition yielded is always the whole string `[n]` and the last one is
//! all singletons.

/// Iterator over the compositions of `n`.
#[derive(Debug, Clone)]
pub struct Compositions {
    n: usize,
    // Masks still to yield, counting down; `remaining - 1` is the next mask.
    remaining: u64,
}

impl Compositions {
    /// Compositions of `n`. `n == 0` and `n > 64` yield nothing.
    pub fn new(n: usize) -> Self {
        let remaining = match n {
            0 => 0,
            n if n > 64 => 0,
            n => 1u64 << (n - 1),
        };
        Self { n, remaining }
    }

    fn parts_for(&self, mask: u64) -> Vec<usize> {
        let mut parts = vec![1usize];
        for j in 0..self.n - 1 {
            if mask & (1u64 << j) != 0 {
                if let Some(last) = parts.last_mut() {
                    *last += 1;
                }
            } else {
                parts.push(1);
            }
        }
        parts
    }
}

impl Iterator for Compositions {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        Some(self.parts_for(self.remaining))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match usize::try_from(self.remaining) {
            Ok(n) => (n, Some(n)),
            Err(_) => (usize::MAX, None),
        }
    }
}

/// Collect every composition of `n`, whole string first.
pub fn compositions(n: usize) -> Vec<Vec<usize>> {
    Compositions::new(n).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_counts_and_sums_up_to_eight() {
        for n in 1..=8usize {
            let all = compositions(n);
            assert_eq!(all.len(), 1 << (n - 1), "n = {}", n);

            let distinct: HashSet<&Vec<usize>> = all.iter().collect();
            assert_eq!(distinct.len(), all.len(), "duplicates for n = {}", n);

            for parts in &all {
                assert!(parts.iter().all(|&p| p > 0));
                assert_eq!(parts.iter().sum::<usize>(), n);
            }
        }
    }

    #[test]
    fn test_whole_string_comes_first() {
        for n in 1..=8usize {
            assert_eq!(compositions(n)[0], vec![n]);
        }
        assert_eq!(compositions(3).last(), Some(&vec![1, 1, 1]));
    }

    #[test]
    fn test_order_for_three() {
        assert_eq!(
            compositions(3),
            vec![vec![3], vec![1, 2], vec![2, 1], vec![1, 1, 1]]
        );
    }

    #[test]
    fn test_zero_yields_nothing() {
        assert!(compositions(0).is_empty());
        assert_eq!(Compositions::new(0).size_hint(), (0, Some(0)));
    }
}
