//! Codon optimisation: back-translate a coding sequence using the host's
//! most frequent codon for every amino acid.

use biosynth_common::sequence::{gc_content, normalize};
use biosynth_common::Organism;
use tracing::debug;

/// Emitted for amino acids the host table does not cover.
pub const UNKNOWN_CODON: &str = "NNN";

/// Standard genetic code, codons enumerated in T, C, A, G order.
const STANDARD_CODE: &[u8; 64] = b"FFLLSSSSYY**CC*WLLLLPPPPHHQQRRRRIIIMTTTTNNKKSSRRVVVVAAAADDEEGGGG";

fn base_index(base: u8) -> Option<usize> {
    match base {
        b'T' => Some(0),
        b'C' => Some(1),
        b'A' => Some(2),
        b'G' => Some(3),
        _ => None,
    }
}

fn translate_codon(codon: &[u8]) -> Option<char> {
    let [a, b, c] = codon else { return None };
    let idx = base_index(*a)? * 16 + base_index(*b)? * 4 + base_index(*c)?;
    Some(STANDARD_CODE[idx] as char)
}

/// Translate a nucleotide sequence, stopping at (and excluding) the first
/// in-frame stop codon. `None` if the length is not a multiple of three or a
/// base is outside `ACGT`.
pub fn translate(sequence: &str) -> Option<String> {
    let bytes = sequence.as_bytes();
    if bytes.len() % 3 != 0 {
        return None;
    }
    let mut protein = String::with_capacity(bytes.len() / 3);
    for codon in bytes.chunks(3) {
        match translate_codon(codon)? {
            '*' => break,
            aa => protein.push(aa),
        }
    }
    Some(protein)
}

#[derive(Debug, Default, Clone, Copy)]
pub struct CodonOptimizer;

impl CodonOptimizer {
    pub fn new() -> Self {
        Self
    }

    /// Host-optimised recoding of `sequence`; the input is returned unchanged
    /// when it cannot be translated.
    pub fn optimize(&self, sequence: &str, organism: Organism) -> String {
        let normalized = normalize(sequence);
        let Some(protein) = translate(&normalized) else {
            debug!(len = sequence.len(), "Sequence not translatable, leaving it unchanged");
            return sequence.to_string();
        };

        let table = organism.codon_table();
        let optimized: String = protein
            .chars()
            .map(|aa| table.preferred_codon(aa).unwrap_or(UNKNOWN_CODON))
            .collect();

        debug!(
            organism = %organism,
            original_bp = normalized.len(),
            optimized_bp = optimized.len(),
            gc_before = gc_content(&normalized),
            gc_after = gc_content(&optimized),
            "Codon optimisation complete"
        );
        optimized
    }
}
