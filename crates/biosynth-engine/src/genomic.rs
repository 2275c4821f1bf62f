//! Genomic database access.
//!
//! The pipeline only depends on the [`GenomicDatabase`] trait; [`NcbiClient`]
//! talks to NCBI E-utilities (esearch / esummary / elink / efetch).

use async_trait::async_trait;
use biosynth_common::error::BiosynthError;
use biosynth_common::sandbox::SandboxClient;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument};

const EUTILS_BASE: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils";
const MAX_SEARCH_RESULTS: u32 = 5;

#[derive(Debug, Error)]
pub enum GenomicError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Sandbox(#[from] BiosynthError),
    #[error("Malformed response: {0}")]
    Malformed(String),
}

/// Gene metadata as reported by the database.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneInfo {
    pub id: String,
    pub name: String,
    pub description: String,
    pub organism: String,
}

#[async_trait]
pub trait GenomicDatabase: Send + Sync {
    /// Candidate gene ids for `gene` in `species`, best match first.
    async fn search_gene(&self, gene: &str, species: &str) -> Result<Vec<String>, GenomicError>;

    async fn gene_info(&self, id: &str) -> Result<Option<GeneInfo>, GenomicError>;

    /// Nucleotide sequence of the gene's first linked record.
    async fn sequence(&self, id: &str) -> Result<Option<String>, GenomicError>;
}

// ── NCBI E-utilities ─────────────────────────────────────────────────────────

pub struct NcbiClient {
    client: SandboxClient,
    api_key: Option<String>,
    email: String,
}

#[derive(Deserialize)]
struct ESearchResponse {
    esearchresult: ESearchResult,
}

#[derive(Deserialize)]
struct ESearchResult {
    #[serde(default)]
    idlist: Vec<String>,
}

#[derive(Deserialize)]
struct ELinkResponse {
    #[serde(default)]
    linksets: Vec<LinkSet>,
}

#[derive(Deserialize)]
struct LinkSet {
    #[serde(default)]
    linksetdbs: Vec<LinkSetDb>,
}

#[derive(Deserialize)]
struct LinkSetDb {
    #[serde(default)]
    links: Vec<String>,
}

impl NcbiClient {
    pub fn new(timeout: Duration, api_key: Option<String>, email: impl Into<String>) -> Result<Self, GenomicError> {
        Ok(Self {
            client: SandboxClient::new(timeout)?,
            api_key,
            email: email.into(),
        })
    }

    fn common_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("tool", "biosynth".to_string()), ("email", self.email.clone())];
        if let Some(key) = &self.api_key {
            params.push(("api_key", key.clone()));
        }
        params
    }

    async fn get_json(&self, endpoint: &str, params: &[(&str, String)]) -> Result<serde_json::Value, GenomicError> {
        let url = format!("{}/{}", EUTILS_BASE, endpoint);
        let resp = self.client
            .get(&url)?
            .query(params)
            .query(&self.common_params())
            .send()
            .await?
            .error_for_status()?;
        Ok(resp.json().await?)
    }
}

#[async_trait]
impl GenomicDatabase for NcbiClient {
    #[instrument(skip(self))]
    async fn search_gene(&self, gene: &str, species: &str) -> Result<Vec<String>, GenomicError> {
        let params = [
            ("db", "gene".to_string()),
            ("term", format!("{}[Gene] AND {}[Organism]", gene, species)),
            ("retmax", MAX_SEARCH_RESULTS.to_string()),
            ("retmode", "json".to_string()),
        ];
        let json = self.get_json("esearch.fcgi", &params).await?;
        let parsed: ESearchResponse = serde_json::from_value(json)
            .map_err(|e| GenomicError::Malformed(e.to_string()))?;
        debug!(hits = parsed.esearchresult.idlist.len(), "esearch complete");
        Ok(parsed.esearchresult.idlist)
    }

    #[instrument(skip(self))]
    async fn gene_info(&self, id: &str) -> Result<Option<GeneInfo>, GenomicError> {
        let params = [
            ("db", "gene".to_string()),
            ("id", id.to_string()),
            ("retmode", "json".to_string()),
        ];
        let json = self.get_json("esummary.fcgi", &params).await?;
        Ok(parse_gene_summary(&json, id))
    }

    #[instrument(skip(self))]
    async fn sequence(&self, id: &str) -> Result<Option<String>, GenomicError> {
        let params = [
            ("dbfrom", "gene".to_string()),
            ("db", "nucleotide".to_string()),
            ("id", id.to_string()),
            ("retmode", "json".to_string()),
        ];
        let json = self.get_json("elink.fcgi", &params).await?;
        let links: ELinkResponse = serde_json::from_value(json)
            .map_err(|e| GenomicError::Malformed(e.to_string()))?;
        let Some(nuccore_id) = links
            .linksets
            .into_iter()
            .flat_map(|s| s.linksetdbs)
            .flat_map(|db| db.links)
            .next()
        else {
            return Ok(None);
        };

        let url = format!("{}/efetch.fcgi", EUTILS_BASE);
        let fasta = self.client
            .get(&url)?
            .query(&[
                ("db", "nucleotide"),
                ("id", nuccore_id.as_str()),
                ("rettype", "fasta"),
                ("retmode", "text"),
            ])
            .query(&self.common_params())
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let sequence = parse_fasta(&fasta);
        Ok((!sequence.is_empty()).then_some(sequence))
    }
}

/// Extract name/description/organism for `id` from an esummary JSON document.
fn parse_gene_summary(json: &serde_json::Value, id: &str) -> Option<GeneInfo> {
    let doc = json.get("result")?.get(id)?;
    if doc.get("error").is_some() {
        return None;
    }
    Some(GeneInfo {
        id: id.to_string(),
        name: doc["name"].as_str().unwrap_or_default().to_string(),
        description: doc["description"].as_str().unwrap_or_default().to_string(),
        organism: doc["organism"]["scientificname"].as_str().unwrap_or_default().to_string(),
    })
}

/// Concatenate the residue lines of a FASTA document, dropping `>` headers.
pub fn parse_fasta(fasta: &str) -> String {
    fasta
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('>'))
        .collect::<String>()
        .to_ascii_uppercase()
}
