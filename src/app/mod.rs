//! The workbench: session state wired to the external collaborators.
//!
//! One [`Workbench`] per user session. It owns the [`Session`] core plus
//! the four collaborator seams (vector search, thesaurus, article graph,
//! summarizer) and exposes the user-level actions: search articles, search
//! terms, toggle selection/expansion, filter, summarize.
//!
//! Failure policy: every action validates and fetches before it mutates,
//! so a failed action leaves all session state exactly as it was. The one
//! nuance is expansion — a failed fetch leaves the node collapsed with its
//! previously cached data intact.

use thiserror::Error;
use tracing::info;

use crate::graph::{
    combine_abstracts, filter_and_rank, GraphError, GraphStore, RankedArticle,
};
use crate::llm::{LlmError, Summarizer, DEFAULT_INSTRUCTION, SYSTEM_PROMPT};
use crate::models::{parse_term_list, ArticlePreview, OrderedSet};
use crate::render::{render_forest, RenderLine};
use crate::search::{
    SearchError, VectorSearch, ARTICLE_COLLECTION, DEFAULT_SEARCH_LIMIT, TERM_COLLECTION,
};
use crate::session::{NodeId, Session};
use crate::thesaurus::{
    sanitize_term, ConceptExpander, Thesaurus, ThesaurusError, DEFAULT_EXPANSION_DEPTH,
};

/// Errors surfaced by workbench actions.
#[derive(Debug, Error)]
pub enum AppError {
    /// Vector search failed
    #[error("search error: {0}")]
    Search(#[from] SearchError),

    /// Thesaurus lookup failed
    #[error("thesaurus error: {0}")]
    Thesaurus(#[from] ThesaurusError),

    /// Graph filtering failed
    #[error("graph error: {0}")]
    Graph(#[from] GraphError),

    /// Summarization failed
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    /// An expansion toggle referenced a node id with no record
    #[error("unknown node id: {0}")]
    UnknownNode(NodeId),

    /// Summarize was invoked before a successful filter
    #[error("no combined text available; filter articles first")]
    NothingToSummarize,
}

/// Result type for workbench actions.
pub type AppResult<T> = Result<T, AppError>;

/// Per-session workbench over the four collaborator seams.
pub struct Workbench<V, T, G, L>
where
    V: VectorSearch,
    T: Thesaurus,
    G: GraphStore,
    L: Summarizer,
{
    session: Session,
    vector: V,
    expander: ConceptExpander<T>,
    graph: G,
    summarizer: L,

    article_previews: Vec<ArticlePreview>,
    candidate_uris: Vec<String>,
    filtered: Vec<RankedArticle>,
    combined_text: Option<String>,
    instruction: String,
}

impl<V, T, G, L> Workbench<V, T, G, L>
where
    V: VectorSearch,
    T: Thesaurus,
    G: GraphStore,
    L: Summarizer,
{
    /// Create a workbench with a fresh session.
    pub fn new(vector: V, thesaurus: T, graph: G, summarizer: L) -> Self {
        Self {
            session: Session::new(),
            vector,
            expander: ConceptExpander::new(thesaurus),
            graph,
            summarizer,
            article_previews: Vec::new(),
            candidate_uris: Vec::new(),
            filtered: Vec::new(),
            combined_text: None,
            instruction: DEFAULT_INSTRUCTION.to_string(),
        }
    }

    /// The session core.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Latest article search previews.
    pub fn article_previews(&self) -> &[ArticlePreview] {
        &self.article_previews
    }

    /// Candidate article URIs captured by the latest article search.
    pub fn candidate_uris(&self) -> &[String] {
        &self.candidate_uris
    }

    /// Latest filtered, ranked articles.
    pub fn filtered(&self) -> &[RankedArticle] {
        &self.filtered
    }

    /// Combined article text for the LLM, if a filter has produced any.
    pub fn combined_text(&self) -> Option<&str> {
        self.combined_text.as_deref()
    }

    /// The current LLM instruction.
    pub fn instruction(&self) -> &str {
        &self.instruction
    }

    /// Replace the LLM instruction.
    pub fn set_instruction(&mut self, instruction: String) {
        self.instruction = instruction;
    }

    /// Vector-search the article collection and capture the hit URIs as
    /// the candidate set for filtering.
    ///
    /// On failure nothing is mutated; the previous previews and candidates
    /// stay in place.
    pub async fn search_articles(&mut self, query: &str) -> AppResult<&[ArticlePreview]> {
        let hits = self
            .vector
            .search(ARTICLE_COLLECTION, query, DEFAULT_SEARCH_LIMIT)
            .await?;
        info!(query, hits = hits.len(), "article search");

        let mut previews = Vec::with_capacity(hits.len());
        let mut candidates = Vec::new();
        for hit in &hits {
            if let Some(uri) = hit.property_str("article_URI") {
                if !uri.is_empty() {
                    candidates.push(uri.to_string());
                }
            }
            let title = hit.property_str("title").unwrap_or("N/A").to_string();
            let abstract_text = hit.property_str("abstractText").unwrap_or("N/A");
            let mesh_terms = hit
                .property_str("meshMajor")
                .map(parse_term_list)
                .unwrap_or_default();
            previews.push(ArticlePreview::new(
                title,
                abstract_text,
                hit.distance,
                mesh_terms,
            ));
        }

        self.article_previews = previews;
        self.candidate_uris = candidates;
        Ok(&self.article_previews)
    }

    /// Vector-search the term collection and start a new epoch with the
    /// sanitized, deduplicated results as root terms.
    ///
    /// The epoch is only bumped after a successful search; a failure
    /// leaves the current forest untouched. The selection set persists
    /// across epochs either way.
    pub async fn search_terms(&mut self, query: &str) -> AppResult<&[String]> {
        let hits = self
            .vector
            .search(TERM_COLLECTION, query, DEFAULT_SEARCH_LIMIT)
            .await?;

        let roots: OrderedSet = hits
            .iter()
            .filter_map(|hit| hit.property_str("meshTerm"))
            .map(sanitize_term)
            .filter(|term| !term.is_empty())
            .collect();
        info!(query, roots = roots.len(), "term search");

        self.session.begin_epoch(roots.into_vec());
        Ok(self.session.current_terms())
    }

    /// Render the current term forest.
    pub fn render_forest(&mut self) -> Vec<RenderLine> {
        render_forest(&mut self.session)
    }

    /// Flip a term's selection flag and return the new value.
    pub fn toggle_selection(&mut self, term: &str) -> bool {
        self.session.toggle_selection(term)
    }

    /// Terms currently selected, in first-appearance order.
    pub fn selected_terms(&self) -> Vec<String> {
        self.session.selected_terms()
    }

    /// Toggle a node between expanded and collapsed; returns the new
    /// expanded state.
    ///
    /// The first expansion fetches alternate names and narrower concepts
    /// from the thesaurus; collapse and later re-expansion reuse the
    /// cached data. A failed fetch leaves the node collapsed and its
    /// cached state untouched.
    pub async fn toggle_expansion(&mut self, id: NodeId) -> AppResult<bool> {
        let store = self.session.store();
        if !store.contains(id) {
            return Err(AppError::UnknownNode(id));
        }

        if store.is_expanded(id) {
            self.session.store_mut().collapse(id);
            return Ok(false);
        }
        if store.is_fetched(id) {
            self.session.store_mut().expand_cached(id);
            return Ok(true);
        }

        let term = store
            .term(id)
            .ok_or(AppError::UnknownNode(id))?
            .to_string();
        let alt_names = self.expander.fetch_alt_names(&term).await?;
        let narrower = self
            .expander
            .fetch_narrower(&term, DEFAULT_EXPANSION_DEPTH)
            .await?;

        self.session.store_mut().store_expansion(id, alt_names, narrower);
        Ok(true)
    }

    /// Filter the candidate articles against the selected terms and cache
    /// the ranked result plus the combined text for summarization.
    pub async fn filter_articles(&mut self) -> AppResult<&[RankedArticle]> {
        let terms = self.session.selected_terms();
        let ranked = filter_and_rank(&self.graph, &terms, &self.candidate_uris).await?;
        info!(terms = terms.len(), retained = ranked.len(), "filter");

        self.combined_text = if ranked.is_empty() {
            None
        } else {
            Some(combine_abstracts(&ranked))
        };
        self.filtered = ranked;
        Ok(&self.filtered)
    }

    /// Summarize the filtered articles with the current instruction.
    pub async fn summarize(&self) -> AppResult<String> {
        let combined = self
            .combined_text
            .as_deref()
            .filter(|text| !text.trim().is_empty())
            .ok_or(AppError::NothingToSummarize)?;
        let user_prompt = format!("{}\n\n{}", self.instruction, combined);
        let summary = self.summarizer.summarize(SYSTEM_PROMPT, &user_prompt).await?;
        Ok(summary)
    }
}
