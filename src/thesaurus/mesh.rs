//! MeSH SPARQL endpoint client.
//!
//! Implements the [`Thesaurus`] trait against the National Library of
//! Medicine's public MeSH SPARQL endpoint. Alternate labels come from the
//! concept relations of the descriptor carrying the queried label; narrower
//! concepts come from the `meshv:broaderDescriptor` relation, read in the
//! narrower direction.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::{sanitize_term, Thesaurus, ThesaurusError, ThesaurusResult};

/// Public MeSH SPARQL endpoint.
pub const MESH_SPARQL_ENDPOINT: &str = "https://id.nlm.nih.gov/mesh/sparql";

/// Timeout applied to every SPARQL request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the MeSH SPARQL endpoint.
pub struct MeshSparqlClient {
    http: reqwest::Client,
    endpoint: String,
}

/// SPARQL JSON results envelope (the subset we read).
#[derive(Debug, Deserialize)]
struct SparqlResponse {
    results: SparqlResults,
}

#[derive(Debug, Deserialize)]
struct SparqlResults {
    bindings: Vec<HashMap<String, SparqlTerm>>,
}

#[derive(Debug, Deserialize)]
struct SparqlTerm {
    value: String,
}

impl MeshSparqlClient {
    /// Create a client against the public endpoint.
    pub fn new() -> ThesaurusResult<Self> {
        Self::with_endpoint(MESH_SPARQL_ENDPOINT.to_string())
    }

    /// Create a client against a custom endpoint (used by tests and
    /// mirrors).
    pub fn with_endpoint(endpoint: String) -> ThesaurusResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ThesaurusError::ConfigError(e.to_string()))?;
        Ok(Self { http, endpoint })
    }

    /// Escape a term for embedding in a SPARQL string literal.
    fn escape_literal(term: &str) -> String {
        term.replace('\\', "\\\\").replace('"', "\\\"")
    }

    /// Query for concept-relation objects of the descriptor labelled `term`.
    fn alt_labels_query(term: &str) -> String {
        let term = Self::escape_literal(term);
        format!(
            r#"PREFIX rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#>
PREFIX rdfs: <http://www.w3.org/2000/01/rdf-schema#>
PREFIX meshv: <http://id.nlm.nih.gov/mesh/vocab#>
PREFIX mesh: <http://id.nlm.nih.gov/mesh/>

SELECT ?subject ?p ?pLabel ?o ?oLabel
FROM <http://id.nlm.nih.gov/mesh>
WHERE {{
    ?subject rdfs:label "{term}"@en .
    ?subject ?p ?o .
    FILTER(CONTAINS(STR(?p), "concept"))
    OPTIONAL {{ ?p rdfs:label ?pLabel . }}
    OPTIONAL {{ ?o rdfs:label ?oLabel . }}
}}"#
        )
    }

    /// Query for descriptors narrower than the descriptor labelled `term`.
    fn narrower_query(term: &str) -> String {
        let term = Self::escape_literal(term);
        format!(
            r#"PREFIX rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#>
PREFIX rdfs: <http://www.w3.org/2000/01/rdf-schema#>
PREFIX meshv: <http://id.nlm.nih.gov/mesh/vocab#>
PREFIX mesh: <http://id.nlm.nih.gov/mesh/>

SELECT ?narrowerConcept ?narrowerConceptLabel
WHERE {{
    ?broaderConcept rdfs:label "{term}"@en .
    ?narrowerConcept meshv:broaderDescriptor ?broaderConcept .
    ?narrowerConcept rdfs:label ?narrowerConceptLabel .
}}"#
        )
    }

    /// Run a SELECT query and return its bindings.
    async fn select(&self, query: &str) -> ThesaurusResult<Vec<HashMap<String, SparqlTerm>>> {
        debug!(endpoint = %self.endpoint, "running SPARQL query");
        let response = self
            .http
            .get(&self.endpoint)
            .query(&[("query", query), ("format", "JSON"), ("inference", "true")])
            .header(reqwest::header::ACCEPT, "application/sparql-results+json")
            .send()
            .await
            .map_err(|e| ThesaurusError::ApiError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ThesaurusError::ApiError(format!(
                "endpoint returned {status}: {body}"
            )));
        }

        let parsed: SparqlResponse = response
            .json()
            .await
            .map_err(|e| ThesaurusError::InvalidResponse(e.to_string()))?;
        Ok(parsed.results.bindings)
    }

    /// Extract one variable's values from a binding set, skipping rows
    /// where the variable is unbound (an unlabelled object is an
    /// empty-result case, not an error).
    fn extract_values(bindings: Vec<HashMap<String, SparqlTerm>>, variable: &str) -> Vec<String> {
        bindings
            .into_iter()
            .filter_map(|mut row| row.remove(variable).map(|term| term.value))
            .collect()
    }
}

#[async_trait]
impl Thesaurus for MeshSparqlClient {
    async fn alt_labels(&self, term: &str) -> ThesaurusResult<Vec<String>> {
        let term = sanitize_term(term);
        let bindings = self.select(&Self::alt_labels_query(&term)).await?;
        Ok(Self::extract_values(bindings, "oLabel"))
    }

    async fn narrower(&self, term: &str) -> ThesaurusResult<Vec<String>> {
        let term = sanitize_term(term);
        let bindings = self.select(&Self::narrower_query(&term)).await?;
        Ok(Self::extract_values(bindings, "narrowerConceptLabel"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alt_labels_query_embeds_term() {
        let query = MeshSparqlClient::alt_labels_query("Mouth Neoplasms");
        assert!(query.contains(r#"rdfs:label "Mouth Neoplasms"@en"#));
        assert!(query.contains("FILTER(CONTAINS(STR(?p), \"concept\"))"));
    }

    #[test]
    fn test_narrower_query_uses_broader_descriptor() {
        let query = MeshSparqlClient::narrower_query("Neoplasms");
        assert!(query.contains("meshv:broaderDescriptor"));
        assert!(query.contains(r#""Neoplasms"@en"#));
    }

    #[test]
    fn test_escape_literal() {
        assert_eq!(
            MeshSparqlClient::escape_literal(r#"a "quoted" term"#),
            r#"a \"quoted\" term"#
        );
    }

    #[test]
    fn test_extract_values_skips_unbound_rows() {
        let bindings = vec![
            HashMap::from([(
                "oLabel".to_string(),
                SparqlTerm {
                    value: "Cancer of Mouth".to_string(),
                },
            )]),
            HashMap::new(),
        ];
        let values = MeshSparqlClient::extract_values(bindings, "oLabel");
        assert_eq!(values, vec!["Cancer of Mouth"]);
    }
}
