use reqwest::{Client, ClientBuilder};
use std::collections::HashSet;
use std::time::Duration;
use url::Url;
use crate::error::BiosynthError;

/// An HTTP client that only allows requests to approved domains.
/// Every external collaborator of the pipeline goes through one of these.
#[derive(Debug, Clone)]
pub struct SandboxClient {
    client: Client,
    allowlist: HashSet<String>,
}

impl SandboxClient {
    /// Creates a new SandboxClient with the default allowlist of genomic, folding, and AI domains.
    pub fn new(timeout: Duration) -> Result<Self, BiosynthError> {
        let domains = [
            "eutils.ncbi.nlm.nih.gov",           // NCBI E-utilities
            "api.esmatlas.com",                  // ESMFold
            "api.anthropic.com",                 // Claude
            "generativelanguage.googleapis.com", // Gemini
            "localhost",
            "127.0.0.1",
        ];
        let allowlist = domains.iter().map(|d| d.to_string()).collect();

        let client = ClientBuilder::new()
            .timeout(timeout)
            .build()
            .map_err(|e| BiosynthError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, allowlist })
    }

    /// Validates if a URL is permitted under the current sandbox policy.
    pub fn is_allowed(&self, url: &str) -> bool {
        let Ok(parsed) = Url::parse(url) else {
            return false;
        };
        let Some(host) = parsed.host_str() else {
            return false;
        };
        // Exact match or subdomain of an allowed domain
        self.allowlist
            .iter()
            .any(|allowed| host == allowed || host.ends_with(&format!(".{}", allowed)))
    }

    fn check(&self, url: &str) -> Result<(), BiosynthError> {
        if !self.is_allowed(url) {
            return Err(BiosynthError::Security(format!(
                "Network capabilities capped: domain not in allowlist for URL {}",
                url
            )));
        }
        Ok(())
    }

    pub fn get(&self, url: &str) -> Result<reqwest::RequestBuilder, BiosynthError> {
        self.check(url)?;
        Ok(self.client.get(url))
    }

    pub fn post(&self, url: &str) -> Result<reqwest::RequestBuilder, BiosynthError> {
        self.check(url)?;
        Ok(self.client.post(url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowlist_matches_hosts_and_subdomains() {
        let client = SandboxClient::new(Duration::from_secs(5)).unwrap();
        assert!(client.is_allowed("https://eutils.ncbi.nlm.nih.gov/entrez/eutils/esearch.fcgi"));
        assert!(client.is_allowed("http://localhost:8080/fold"));
        assert!(client.is_allowed("https://api.anthropic.com/v1/messages"));
        assert!(client.is_allowed(
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent"
        ));
        assert!(!client.is_allowed("https://example.org/"));
        assert!(!client.is_allowed("https://anthropic.com.example.org/"));
        assert!(!client.is_allowed("not a url"));
    }

    #[test]
    fn test_disallowed_request_is_rejected() {
        let client = SandboxClient::new(Duration::from_secs(5)).unwrap();
        let err = client.get("https://evil.test/").unwrap_err();
        assert!(matches!(err, BiosynthError::Security(_)));
    }
}
