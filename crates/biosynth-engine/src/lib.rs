//! biosynth-engine: the gene-synthesis simulation pipeline.
//!
//! Stages, in execution order:
//! 1. Resolve a gene for the requested trait (genomic database, static records, placeholder)
//! 2. Recode it for the host's codon usage
//! 3. Predict off-target binding sites
//! 4. Predict the protein structure (external folding service, simulated fallback)
//! 5. Score risks and overall confidence, choose an insertion locus
//! 6. Write a recommendation (text providers, canned fallback)
//!
//! Results are cached by trait + organism and retained by request id.

pub mod cache;
pub mod codon;
pub mod confidence;
pub mod folding;
pub mod gene;
pub mod genomic;
pub mod locus;
pub mod offtarget;
pub mod pipeline;
pub mod recommend;
pub mod risk;
pub mod rng;
pub mod service;
pub mod structure;

pub use pipeline::{PipelineEvent, SynthesisPipeline};
pub use service::{ServiceError, ServiceStatus, SynthesisService};
