//! Trait → gene resolution.
//!
//! Lookup order: genomic database (for traits with a known gene), the static
//! per-trait records, then a reproducible placeholder gene.

use std::sync::Arc;
use std::time::Duration;

use biosynth_common::tables::{static_gene, trait_gene, TraitGene};
use biosynth_common::{GeneRecord, Organism};
use rand::seq::SliceRandom;
use tracing::{debug, info, warn};

use crate::genomic::{GenomicDatabase, GenomicError};
use crate::rng::seeded_rng;

pub const PLACEHOLDER_GENE: &str = "SIM1";
pub const PLACEHOLDER_ID: &str = "999999999";
const PLACEHOLDER_BASES: usize = 300;

pub struct GeneResolver {
    database: Option<Arc<dyn GenomicDatabase>>,
    timeout: Duration,
    seed: u64,
}

impl GeneResolver {
    pub fn new(database: Option<Arc<dyn GenomicDatabase>>, timeout: Duration, seed: u64) -> Self {
        Self { database, timeout, seed }
    }

    /// Resolve a gene for `desired_trait`. Never fails; degraded sources are logged.
    pub async fn resolve(&self, desired_trait: &str, organism: Organism) -> GeneRecord {
        let normalized = desired_trait.trim().to_lowercase();

        if let (Some(known), Some(db)) = (trait_gene(&normalized), &self.database) {
            match tokio::time::timeout(self.timeout, lookup_external(db.as_ref(), known)).await {
                Ok(Ok(Some(record))) => {
                    info!(gene = %record.name, id = %record.external_id, "Gene resolved from genomic database");
                    return record;
                }
                Ok(Ok(None)) => debug!(gene = known.gene, "Genomic database had no usable record"),
                Ok(Err(e)) => warn!(gene = known.gene, error = %e, "Genomic database lookup failed, using static record"),
                Err(_) => warn!(gene = known.gene, timeout = ?self.timeout, "Genomic database timed out, using static record"),
            }
        }

        if let Some(g) = static_gene(&normalized) {
            debug!(gene = g.name, "Gene resolved from static table");
            return GeneRecord {
                name: g.name.to_string(),
                species: g.species.to_string(),
                external_id: g.external_id.to_string(),
                sequence: g.sequence.to_string(),
                description: g.description.to_string(),
            };
        }

        info!(desired_trait = %desired_trait, "No known gene for trait, generating placeholder");
        self.placeholder(desired_trait, &normalized, organism)
    }

    fn placeholder(&self, desired_trait: &str, normalized: &str, organism: Organism) -> GeneRecord {
        let mut rng = seeded_rng(self.seed, &["gene", normalized, organism.as_str()]);
        let bases: String = (0..PLACEHOLDER_BASES)
            .filter_map(|_| [b'A', b'T', b'C', b'G'].choose(&mut rng).map(|&b| b as char))
            .collect();
        GeneRecord {
            name: PLACEHOLDER_GENE.to_string(),
            species: organism.as_str().to_string(),
            external_id: PLACEHOLDER_ID.to_string(),
            sequence: format!("ATG{}", bases),
            description: format!("Simulated gene for {}", desired_trait),
        }
    }
}

async fn lookup_external(db: &dyn GenomicDatabase, known: &TraitGene) -> Result<Option<GeneRecord>, GenomicError> {
    let ids = db.search_gene(known.gene, known.species).await?;
    let Some(id) = ids.into_iter().next() else {
        return Ok(None);
    };
    let info = db.gene_info(&id).await?;
    let sequence = db.sequence(&id).await?;

    Ok(match (info, sequence) {
        (Some(info), Some(sequence)) if !sequence.is_empty() => Some(GeneRecord {
            name: if info.name.is_empty() { known.gene.to_string() } else { info.name },
            species: if info.organism.is_empty() { known.species.to_string() } else { info.organism },
            external_id: id,
            sequence,
            description: info.description,
        }),
        _ => None,
    })
}
