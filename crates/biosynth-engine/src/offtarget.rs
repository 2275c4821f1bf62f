//! Off-target prediction against the host's genomic hotspot regions.
//!
//! Similarity per region is a context prior scaled by how close the input's
//! GC content is to the GC content expected for the region's risk tier.
//! Regions scoring above [`SIMILARITY_THRESHOLD`] yield one synthetic
//! off-target site each.

use biosynth_common::sequence::{gc_content, hamming_distance, normalize};
use biosynth_common::tables::{expected_gc, HotspotRegion};
use biosynth_common::{OffTargetAnalysis, OffTargetSite, Organism};
use rand::rngs::StdRng;
use rand::seq::{IteratorRandom, SliceRandom};
use rand::Rng;
use thiserror::Error;
use tracing::{debug, warn};

use crate::rng::seeded_rng;

pub const SIMILARITY_THRESHOLD: f64 = 0.6;
/// Similarity assumed for the fixed fallback sites.
pub const FALLBACK_SIMILARITY: f64 = 0.7;
/// Guide used when the input sequence is empty.
pub const EMPTY_INPUT_GUIDE: &str = "ATGCGATCGTAGC";
const GUIDE_LEN: usize = 20;
const MANY_SITES: usize = 5;

#[derive(Debug, Error)]
enum ScanError {
    #[error("unexpected symbol '{0}' in sequence")]
    InvalidSymbol(char),
    #[error("region {chromosome}:{start}-{end} has an inverted span")]
    InvertedSpan { chromosome: &'static str, start: u64, end: u64 },
}

pub struct OffTargetPredictor {
    seed: u64,
}

impl OffTargetPredictor {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    pub fn predict(&self, sequence: &str, organism: Organism) -> OffTargetAnalysis {
        let sequence = normalize(sequence);
        let mut rng = seeded_rng(self.seed, &["offtarget", organism.as_str(), &sequence]);

        match scan(&sequence, organism.hotspots(), &mut rng) {
            Ok(sites) => {
                let warnings = warnings_for(&sites);
                debug!(organism = %organism, sites = sites.len(), "Off-target scan complete");
                OffTargetAnalysis::new(sites, warnings)
            }
            Err(e) => {
                warn!(organism = %organism, error = %e, "Off-target scan failed, using fixed reference sites");
                let sites = fallback_sites(&sequence, organism, &mut rng);
                OffTargetAnalysis::new(
                    sites,
                    vec!["Using simplified off-target analysis due to database limitations".to_string()],
                )
            }
        }
    }
}

/// `base(context) * (1 - |GC% - expected GC%(tier)| / 100)`.
pub fn region_similarity(sequence_gc: f64, region: &HotspotRegion) -> f64 {
    let gc_factor = 1.0 - (sequence_gc - expected_gc(region.tier)).abs() / 100.0;
    region.context.base_similarity() * gc_factor
}

fn scan(sequence: &str, regions: &[HotspotRegion], rng: &mut StdRng) -> Result<Vec<OffTargetSite>, ScanError> {
    if let Some(bad) = sequence.chars().find(|c| !matches!(c, 'A' | 'C' | 'G' | 'T' | 'N')) {
        return Err(ScanError::InvalidSymbol(bad));
    }
    let gc = gc_content(sequence);

    let mut sites = Vec::new();
    for region in regions {
        if region.start > region.end {
            return Err(ScanError::InvertedSpan {
                chromosome: region.chromosome,
                start: region.start,
                end: region.end,
            });
        }
        let similarity = region_similarity(gc, region);
        if similarity <= SIMILARITY_THRESHOLD {
            continue;
        }
        let target = synthesize_target(sequence, similarity, rng);
        sites.push(OffTargetSite {
            mismatch_count: hamming_distance(sequence, &target),
            sequence: target,
            chromosome: region.chromosome.to_string(),
            position: rng.gen_range(region.start..=region.end),
            impact: region.tier,
        });
    }
    Ok(sites)
}

/// First `min(20, len)` bases with `round((1 - similarity) * n)` distinct
/// positions substituted by a different base.
fn synthesize_target(sequence: &str, similarity: f64, rng: &mut StdRng) -> String {
    if sequence.is_empty() {
        return EMPTY_INPUT_GUIDE.to_string();
    }
    let mut guide: Vec<u8> = sequence.bytes().take(GUIDE_LEN).collect();
    let n = guide.len();
    let mismatches = (((1.0 - similarity) * n as f64).round().max(0.0) as usize).min(n);

    for pos in (0..n).choose_multiple(rng, mismatches) {
        let current = guide[pos];
        let choices: Vec<u8> = b"ATGC".iter().copied().filter(|&b| b != current).collect();
        if let Some(&replacement) = choices.choose(rng) {
            guide[pos] = replacement;
        }
    }
    String::from_utf8_lossy(&guide).into_owned()
}

fn fallback_sites(sequence: &str, organism: Organism, rng: &mut StdRng) -> Vec<OffTargetSite> {
    organism
        .fallback_sites()
        .iter()
        .map(|site| {
            let target = synthesize_target(sequence, FALLBACK_SIMILARITY, rng);
            OffTargetSite {
                mismatch_count: hamming_distance(sequence, &target),
                sequence: target,
                chromosome: site.chromosome.to_string(),
                position: site.position,
                impact: site.tier,
            }
        })
        .collect()
}

fn warnings_for(sites: &[OffTargetSite]) -> Vec<String> {
    let mut warnings = Vec::new();
    if sites.len() > MANY_SITES {
        warnings.push("High number of potential off-target sites detected - consider sequence refinement".to_string());
    }
    let high = sites.iter().filter(|s| s.impact == biosynth_common::Impact::High).count();
    if high > 0 {
        warnings.push(format!("{} high-risk off-target sites in critical genomic regions", high));
    }
    let close = sites.iter().filter(|s| s.mismatch_count <= 2).count();
    if close > 0 {
        warnings.push(format!("{} sites with ≤2 mismatches - very high off-target risk", close));
    }
    if sites.is_empty() {
        warnings.push("No significant off-target sites detected - low risk profile".to_string());
    }
    warnings
}
