//! Graph RAG for medical journal articles.
//!
//! This library implements a retrieval-augmented workflow over medical
//! literature: semantic vector search for articles and subject terms,
//! interactive refinement of a controlled vocabulary against the MeSH
//! concept hierarchy, graph-based filtering of the article set, and LLM
//! summarization of the filtered results.
//!
//! # Architecture
//!
//! The system is organized into several key modules:
//!
//! - **models**: Shared data structures (article previews, ordered sets)
//! - **session**: Per-session state — identity registry, node store,
//!   selection set, and the epoch lifecycle that keeps tree identities
//!   stable across re-renders
//! - **thesaurus**: Concept expansion against an external thesaurus
//!   (alternate labels and narrower-concept relations)
//! - **render**: Recursive, cycle-safe traversal of the term forest into a
//!   flat list of renderable lines with stable node identities
//! - **search**: Vector search over article and term collections
//! - **graph**: Structured-dataset filtering, term-match ranking, and
//!   one-shot dataset download
//! - **llm**: LLM summarization of combined article text
//! - **app**: The workbench that wires the session to the collaborators
//!
//! # Workflow
//!
//! 1. Search articles by free text; the hit URIs become the candidate set
//! 2. Search subject terms; the results seed a fresh term forest
//! 3. Expand and select terms interactively; selections persist across
//!    searches, tree identities persist across re-renders
//! 4. Filter the candidate articles by the selected terms and rank them by
//!    the number of distinct matched terms
//! 5. Summarize the top-ranked articles with an LLM
//!
//! # Example
//!
//! ```ignore
//! use medgraph_rag::{
//!     app::Workbench,
//!     graph::memory::MemoryGraphStore,
//!     llm::openai::OpenAiChat,
//!     search::weaviate::WeaviateClient,
//!     thesaurus::mesh::MeshSparqlClient,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let vector = WeaviateClient::new(weaviate_url, api_key, openai_key)?;
//!     let thesaurus = MeshSparqlClient::new()?;
//!     let graph = MemoryGraphStore::from_json_file("pubmed_graph.json").await?;
//!     let summarizer = OpenAiChat::new(openai_key, None)?;
//!
//!     let mut bench = Workbench::new(vector, thesaurus, graph, summarizer);
//!     bench.search_articles("Mouth Neoplasms").await?;
//!     bench.search_terms("Mouth Neoplasms").await?;
//!
//!     for line in bench.render_forest() {
//!         println!("{:?}", line);
//!     }
//!     Ok(())
//! }
//! ```

// Public modules
pub mod app;
pub mod graph;
pub mod llm;
pub mod models;
pub mod render;
pub mod search;
pub mod session;
pub mod thesaurus;

// Re-export commonly used types at the crate root
pub use app::Workbench;
pub use models::OrderedSet;
pub use render::{render_forest, RenderLine};
pub use search::{SearchHit, VectorSearch};
pub use session::{Epoch, NodeId, Session};
pub use thesaurus::{sanitize_term, ConceptExpander, Thesaurus};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
