//! Insertion locus selection.

use biosynth_common::tables::{NamedLocus, GENERIC_INSERTION_LOCUS};
use biosynth_common::Organism;

const SMALL_CONSTRUCT: usize = 2000;
const MEDIUM_CONSTRUCT: usize = 5000;

fn by_name(loci: &[NamedLocus], name: &str) -> Option<&'static str> {
    loci.iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|&(_, locus)| locus)
}

/// Pick an integration site for `gene_name` in `organism`.
///
/// Gene-specific loci win (exact name, then gene-family substring match),
/// then a safe harbor chosen by construct size, then a generic site.
pub fn select(gene_name: &str, organism: Organism, sequence_len: usize) -> String {
    let gene = gene_name.trim().to_ascii_uppercase();
    let gene_loci = organism.gene_loci();

    if !gene.is_empty() {
        if let Some(locus) = by_name(gene_loci, &gene) {
            return locus.to_string();
        }
        let family = gene_loci.iter().find(|(stored, _)| {
            let stored = stored.to_ascii_uppercase();
            stored.contains(&gene) || gene.contains(&stored)
        });
        if let Some(&(_, locus)) = family {
            return locus.to_string();
        }
    }

    let harbors = organism.safe_harbors();
    let Some(&(_, first)) = harbors.first() else {
        return GENERIC_INSERTION_LOCUS.to_string();
    };

    let locus = if sequence_len < SMALL_CONSTRUCT {
        by_name(harbors, "AAVS1").unwrap_or(first)
    } else if sequence_len < MEDIUM_CONSTRUCT {
        by_name(harbors, "ROSA26")
            .or_else(|| harbors.get(1).map(|&(_, l)| l))
            .unwrap_or(first)
    } else {
        by_name(harbors, "CCR5").unwrap_or(first)
    };
    locus.to_string()
}
