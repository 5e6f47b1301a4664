//! Ratcliff/Obershelp string similarity
//!
//! `ratio(a, b) = 2 * M / (len(a) + len(b))` where `M` is the number of
//! characters in the matching blocks found by recursively taking the
//! longest common substring and matching what lies to its left and right.
//! Lengths are counted in chars, so accented descriptions score the same as
//! their plain-ASCII shape would.

/// Similarity in `[0, 1]`. Two empty strings are identical (1.0).
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }

    2.0 * matching_chars(&a, &b) as f64 / total as f64
}

/// Sum of the sizes of all matching blocks between `a` and `b`
fn matching_chars(a: &[char], b: &[char]) -> usize {
    let mut matched = 0;
    let mut pending = vec![(0, a.len(), 0, b.len())];

    while let Some((alo, ahi, blo, bhi)) = pending.pop() {
        let (i, j, size) = longest_match(a, b, alo, ahi, blo, bhi);
        if size == 0 {
            continue;
        }
        matched += size;
        if alo < i && blo < j {
            pending.push((alo, i, blo, j));
        }
        if i + size < ahi && j + size < bhi {
            pending.push((i + size, ahi, j + size, bhi));
        }
    }

    matched
}

/// Longest common block of `a[alo..ahi]` and `b[blo..bhi]`.
///
/// Ties go to the block that ends earliest in `a`, then earliest in `b`.
fn longest_match(
    a: &[char],
    b: &[char],
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let (mut best_i, mut best_j, mut best_size) = (alo, blo, 0);

    // run[k + 1] = length of the common run ending at a[i - 1], b[blo + k]
    let width = bhi.saturating_sub(blo) + 1;
    let mut prev = vec![0usize; width];
    let mut cur = vec![0usize; width];

    for i in alo..ahi {
        for j in blo..bhi {
            let slot = j - blo + 1;
            if a[i] == b[j] {
                let size = prev[slot - 1] + 1;
                cur[slot] = size;
                if size > best_size {
                    best_i = i + 1 - size;
                    best_j = j + 1 - size;
                    best_size = size;
                }
            } else {
                cur[slot] = 0;
            }
        }
        std::mem::swap(&mut prev, &mut cur);
    }

    (best_i, best_j, best_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_identical_and_empty() {
        assert!(close(ratio("uber", "uber"), 1.0));
        assert!(close(ratio("", ""), 1.0));
        assert!(close(ratio("uber", ""), 0.0));
        assert!(close(ratio("abc", "xyz"), 0.0));
    }

    #[test]
    fn test_matching_blocks() {
        // "ab" + "cd" match around the extra "x"
        assert!(close(ratio("abxcd", "abcd"), 8.0 / 9.0));
        assert!(close(ratio("abcd", "bcde"), 6.0 / 8.0));
    }

    #[test]
    fn test_symmetric_for_simple_inputs() {
        let pairs = [("farmacia", "farmácia"), ("uber trip", "uber"), ("metro", "metrô")];
        for (a, b) in pairs {
            assert!(close(ratio(a, b), ratio(b, a)), "{} / {}", a, b);
        }
    }

    #[test]
    fn test_counts_chars_not_bytes() {
        // 7 of 8 chars line up either side of the accent
        assert!(close(ratio("farmácia", "farmacia"), 14.0 / 16.0));
    }

    #[test]
    fn test_typo_clears_keyword_threshold() {
        assert!(ratio("supermecado", "supermercado") > 0.6);
        assert!(ratio("padaria", "supermercado") < 0.6);
    }
}
