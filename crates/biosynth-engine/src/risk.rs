//! Deterministic risk scoring.

use biosynth_common::{GeneRecord, Organism, RiskAssessment};
use tracing::debug;

use crate::rng::{digest, unit_fraction};

pub const TOXICITY_RANGE: (f64, f64) = (0.1, 0.8);
pub const IMMUNOGENICITY_RANGE: (f64, f64) = (0.1, 0.7);
pub const ENVIRONMENTAL_RANGE: (f64, f64) = (0.1, 0.5);

pub const NO_SIGNIFICANT_RISK: &str =
    "No significant risks identified. Proceed with standard validation protocols.";

fn scale((lo, hi): (f64, f64), fraction: f64) -> f64 {
    lo + (hi - lo) * fraction
}

pub struct RiskAssessor {
    seed: u64,
}

impl RiskAssessor {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Same gene, host and seed always give the same scores.
    pub fn assess(&self, gene: &GeneRecord, organism: Organism) -> RiskAssessment {
        let d = digest(self.seed, &["risk", &gene.external_id, &gene.sequence, organism.as_str()]);
        let toxicity = scale(TOXICITY_RANGE, unit_fraction(&d[0..8]));
        let immunogenicity = scale(IMMUNOGENICITY_RANGE, unit_fraction(&d[8..16]));
        let environmental_risk = scale(ENVIRONMENTAL_RANGE, unit_fraction(&d[16..24]));

        debug!(toxicity, immunogenicity, environmental_risk, "Risk scores computed");
        RiskAssessment {
            toxicity,
            immunogenicity,
            environmental_risk,
            recommendations: recommendations_for(toxicity, immunogenicity, environmental_risk),
        }
    }
}

pub fn recommendations_for(toxicity: f64, immunogenicity: f64, environmental_risk: f64) -> Vec<String> {
    let mut out = Vec::new();
    if toxicity > 0.6 {
        out.push("Consider protein engineering to reduce potential toxicity".to_string());
    }
    if immunogenicity > 0.5 {
        out.push("Evaluate potential immune responses in the host organism".to_string());
    }
    if environmental_risk > 0.4 {
        out.push("Implement containment strategies for environmental release".to_string());
    }
    if out.is_empty() {
        out.push(NO_SIGNIFICANT_RISK.to_string());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gene(id: &str) -> GeneRecord {
        GeneRecord {
            name: "LRP5".into(),
            external_id: id.into(),
            sequence: "ATGGGCTCT".into(),
            ..GeneRecord::default()
        }
    }

    #[test]
    fn test_scores_are_reproducible_and_in_range() {
        let assessor = RiskAssessor::new(42);
        for id in ["1", "2", "3", "101885918", "999999999"] {
            let a = assessor.assess(&gene(id), Organism::Human);
            assert_eq!(a, assessor.assess(&gene(id), Organism::Human));
            assert!((0.1..=0.8).contains(&a.toxicity));
            assert!((0.1..=0.7).contains(&a.immunogenicity));
            assert!((0.1..=0.5).contains(&a.environmental_risk));
            assert!(!a.recommendations.is_empty());
        }
    }

    #[test]
    fn test_seed_changes_scores() {
        let a = RiskAssessor::new(1).assess(&gene("1"), Organism::Mouse);
        let b = RiskAssessor::new(2).assess(&gene("1"), Organism::Mouse);
        assert_ne!(a.toxicity, b.toxicity);
    }

    #[test]
    fn test_recommendation_rules() {
        assert_eq!(recommendations_for(0.2, 0.2, 0.2), vec![NO_SIGNIFICANT_RISK.to_string()]);
        let all = recommendations_for(0.7, 0.6, 0.45);
        assert_eq!(all.len(), 3);
        assert!(all[0].contains("toxicity"));
        assert!(all[1].contains("immune"));
        assert!(all[2].contains("containment"));
        // Thresholds are strict.
        assert_eq!(recommendations_for(0.6, 0.5, 0.4).len(), 1);
    }
}
