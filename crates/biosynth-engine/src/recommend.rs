//! Natural-language recommendation for a finished analysis.
//!
//! Tries the configured text providers in order; when none produces text a
//! keyword-selected canned paragraph is returned, so the result is never empty.

use biosynth_llm::{LlmRequest, ProviderChain};
use tracing::{info, warn};

/// Inputs the recommendation prompt is built from.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisSummary {
    pub gene_name: String,
    pub species: String,
    pub sequence_length: usize,
    pub off_target_sites: usize,
    pub structure_confidence: f64,
}

const BONE_RECOMMENDATION: &str = "Based on analysis of the LRP5 gene from Ursus maritimus, this modification shows high potential for increasing bone density. Recommended next steps: 1) Validate in vitro using osteoblast cell cultures, 2) Conduct limited in vivo trials with monitoring for potential off-target effects, 3) Consider codon optimization for improved expression in the host organism.";

const RADIATION_RECOMMENDATION: &str = "Analysis of the XP-V gene from Deinococcus radiodurans suggests strong potential for UV radiation tolerance. Recommendations: 1) Test in cell cultures under UV exposure, 2) Evaluate potential interactions with host DNA repair mechanisms, 3) Consider controlled environmental release trials after thorough safety testing.";

const GENERIC_RECOMMENDATION: &str = "Based on the genetic analysis, this modification appears feasible but requires careful validation. Recommended next steps: 1) Conduct in vitro testing to confirm functionality, 2) Perform thorough off-target analysis, 3) Implement contained field trials before any environmental release, 4) Monitor for potential immune responses in the host organism.";

/// Persona sent as the system message.
pub const SYSTEM_PROMPT: &str = "You are a synthetic biology expert.";

pub fn build_prompt(summary: &AnalysisSummary) -> String {
    format!(
        "Based on the following genetic analysis, provide a detailed and explanatory response:\n\n\
         Gene: {}\n\
         Species: {}\n\
         Sequence Length: {}\n\
         Off-target Sites: {}\n\
         Protein Structure Confidence: {:.2}\n\n\
         In your response, please address the following points in a clear and thorough way, using full explanations rather than short bullet points:\n\n\
         1. Assess the overall viability of performing genetic engineering on this gene in the given species.\n\
         2. Discuss potential risks that may arise from this modification, and explain strategies that could be used to mitigate those risks.\n\
         3. Recommend logical next steps for experimental design or validation, explaining why each step is important.\n\
         4. If there are concerns with this approach, describe alternative strategies or methods that could be more effective or safer.\n\n\
         Ensure the response flows like an expert's written assessment rather than a list of items.",
        summary.gene_name,
        summary.species,
        summary.sequence_length,
        summary.off_target_sites,
        summary.structure_confidence,
    )
}

/// Keyword-selected paragraph used when no provider answers.
pub fn canned_recommendation(prompt: &str) -> &'static str {
    let text = prompt.to_lowercase();
    let has_any = |words: &[&str]| words.iter().any(|w| text.contains(w));
    if has_any(&["bone", "density", "lrp5"]) {
        BONE_RECOMMENDATION
    } else if has_any(&["uv", "radiation", "tolerance", "xp-v"]) {
        RADIATION_RECOMMENDATION
    } else {
        GENERIC_RECOMMENDATION
    }
}

pub struct RecommendationGenerator {
    chain: ProviderChain,
    max_tokens: u32,
}

impl RecommendationGenerator {
    pub fn new(chain: ProviderChain, max_tokens: u32) -> Self {
        Self { chain, max_tokens }
    }

    pub fn chain(&self) -> &ProviderChain {
        &self.chain
    }

    pub async fn recommend(&self, summary: &AnalysisSummary) -> String {
        let request = LlmRequest::prompt(build_prompt(summary), self.max_tokens).with_system(SYSTEM_PROMPT);
        match self.chain.complete(request).await {
            Ok(done) => done.response.content.trim().to_string(),
            Err(e) => {
                warn!(error = %e, "No text provider available, using canned recommendation");
                // Keywords are matched against the analysed gene, not the prompt boilerplate.
                let keywords = format!("{} {}", summary.gene_name, summary.species);
                let text = canned_recommendation(&keywords);
                info!(gene = %summary.gene_name, "Canned recommendation selected");
                text.to_string()
            }
        }
    }
}
