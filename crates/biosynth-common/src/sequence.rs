//! Small nucleotide-sequence helpers shared by several pipeline stages.

/// GC percentage in `[0, 100]`. An empty sequence counts as 50%.
pub fn gc_content(sequence: &str) -> f64 {
    if sequence.is_empty() {
        return 50.0;
    }
    let gc = sequence
        .bytes()
        .filter(|b| matches!(b.to_ascii_uppercase(), b'G' | b'C'))
        .count();
    100.0 * gc as f64 / sequence.len() as f64
}

/// Hamming distance over the overlapping prefix; the longer input is truncated.
pub fn hamming_distance(a: &str, b: &str) -> u32 {
    a.bytes().zip(b.bytes()).filter(|(x, y)| x != y).count() as u32
}

/// Upper-cases and strips whitespace, leaving every other character as is.
pub fn normalize(sequence: &str) -> String {
    sequence
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gc_content() {
        assert_eq!(gc_content(""), 50.0);
        assert_eq!(gc_content("GCGC"), 100.0);
        assert_eq!(gc_content("ATGC"), 50.0);
        assert_eq!(gc_content("atat"), 0.0);
    }

    #[test]
    fn test_hamming_truncates_to_shorter() {
        assert_eq!(hamming_distance("ACGT", "ACGA"), 1);
        assert_eq!(hamming_distance("ACGTTTTT", "TCG"), 1);
        assert_eq!(hamming_distance("", "ACGT"), 0);
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("at g\nc"), "ATGC");
    }
}
