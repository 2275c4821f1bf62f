//! biosynth-common: Shared types, lookup tables, and helpers used across all BioSynth crates.

pub mod error;
pub mod organism;
pub mod entities;
pub mod sequence;
pub mod tables;
pub mod sandbox;

// Re-export commonly used types
pub use organism::Organism;
pub use entities::{
    GeneRecord, Impact, OffTargetAnalysis, OffTargetSite, RiskAssessment, StructureMethod,
    StructurePrediction, SynthesisRequest, SynthesisResult, SynthesisStatus,
};
