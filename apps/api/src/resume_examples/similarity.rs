//! Substring-tolerant string similarity on a 0–100 scale.
//!
//! Similarity between two sequences is the normalized Indel similarity
//! `2 · LCS / (|a| + |b|)`, where LCS is the longest common subsequence length.

/// Scores how well the shorter sequence fits inside the longer one.
///
/// Takes the best Indel similarity over every alignment in the longer sequence: all
/// full-length windows plus the partial windows hanging off either end. Equal-length
/// inputs are aligned in both directions.
///
/// Comparison is by `char`, so Cyrillic and other multi-byte input is handled per
/// character.
pub fn partial_ratio_chars(a: &[char], b: &[char]) -> f64 {
    let (shorter, longer) = if a.len() <= b.len() { (a, b) } else { (b, a) };

    if shorter.is_empty() {
        return if longer.is_empty() { 100.0 } else { 0.0 };
    }

    let mut scratch = Vec::new();
    let best = best_alignment(shorter, longer, &mut scratch);
    if best < 100.0 && shorter.len() == longer.len() {
        return best.max(best_alignment(longer, shorter, &mut scratch));
    }
    best
}

fn best_alignment(needle: &[char], haystack: &[char], scratch: &mut Vec<usize>) -> f64 {
    let m = needle.len();
    let n = haystack.len();

    // A window whose new edge char is absent from the needle scores below its
    // neighbour, so it can be skipped.
    let in_needle = |c: &char| needle.contains(c);

    let head = (1..m)
        .filter(|&k| in_needle(&haystack[k - 1]))
        .map(|k| &haystack[..k]);
    let full = (0..=n - m)
        .filter(|&i| in_needle(&haystack[i + m - 1]))
        .map(|i| &haystack[i..i + m]);
    let tail = (n - m + 1..n)
        .filter(|&i| in_needle(&haystack[i]))
        .map(|i| &haystack[i..]);

    let mut best = 0.0_f64;
    for window in head.chain(full).chain(tail) {
        let score = indel_ratio(needle, window, scratch);
        if score > best {
            best = score;
            if best >= 100.0 {
                break;
            }
        }
    }
    best
}

fn indel_ratio(a: &[char], b: &[char], scratch: &mut Vec<usize>) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return 100.0;
    }
    200.0 * lcs_len(a, b, scratch) as f64 / total as f64
}

/// Longest common subsequence length, single-row dynamic programming.
fn lcs_len(a: &[char], b: &[char], row: &mut Vec<usize>) -> usize {
    row.clear();
    row.resize(b.len() + 1, 0);

    for ca in a {
        let mut diagonal = 0;
        for (j, cb) in b.iter().enumerate() {
            let above = row[j + 1];
            row[j + 1] = if ca == cb {
                diagonal + 1
            } else {
                above.max(row[j])
            };
            diagonal = above;
        }
    }
    row[b.len()]
}
