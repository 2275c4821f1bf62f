//! Overall confidence score for a designed construct.

/// Pure function of the sequence length and its GC content, within [0.3, 0.95].
pub fn score(sequence: &str, gc_content: f64) -> f64 {
    let len = sequence.len();
    let mut s: f64 = 0.6;

    s += if (40.0..=60.0).contains(&gc_content) {
        0.15
    } else if (30.0..=70.0).contains(&gc_content) {
        0.05
    } else {
        -0.1
    };

    if len > 30 && len % 3 == 0 {
        s += 0.1;
    }

    s += match len {
        l if l < 2000 => 0.15,
        l if l < 5000 => 0.05,
        _ => -0.1,
    };

    s.clamp(0.3, 0.95)
}

#[cfg(test)]
mod tests {
    use super::*;
    use biosynth_common::sequence::gc_content;

    #[test]
    fn test_ideal_construct_hits_ceiling() {
        let seq = "ATGC".repeat(375);
        assert_eq!(seq.len(), 1500);
        assert_eq!(score(&seq, gc_content(&seq)), 0.95);
    }

    #[test]
    fn test_poor_construct() {
        // 0.6 - 0.1 (GC 0) + 0 - 0.1 (len > 5000)
        let seq = "A".repeat(6001);
        assert!((score(&seq, gc_content(&seq)) - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_intermediate_bands() {
        // 0.6 + 0.05 (GC 35) + 0 (len 31) + 0.15
        assert!((score(&"A".repeat(31), 35.0) - 0.8).abs() < 1e-9);
        // 0.6 + 0.15 + 0.1 + 0.05 (len 3000)
        assert!((score(&"A".repeat(3000), 50.0) - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_empty_sequence() {
        // 0.6 + 0.15 (GC 50) + 0 + 0.15
        assert!((score("", gc_content("")) - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_pure_and_bounded() {
        for len in [0usize, 3, 33, 1999, 2000, 4999, 5000, 12000] {
            for gc in [0.0, 29.9, 30.0, 45.0, 70.0, 100.0] {
                let seq = "G".repeat(len);
                let a = score(&seq, gc);
                assert_eq!(a, score(&seq, gc));
                assert!((0.3..=0.95).contains(&a));
            }
        }
    }
}
