//! # coursescout
//!
//! Scrapes course listing cards with a headless browser and serves a search
//! form over them, in one of two flavours:
//!
//! - **semantic**: the scraped title and description are embedded with a
//!   FastEmbed model and queries return the two most similar courses.
//! - **catalog**: the scrape is written to a JSON file and queries return
//!   every course whose title contains the query, ignoring case.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use coursescout::{
//!     ChromeLauncher, Collector, CollectorConfig, FormServer, InMemoryCourseIndex,
//!     LocalEmbedder, SemanticFrontEnd, DEFAULT_COURSES_URL,
//! };
//!
//! # async fn run() -> anyhow::Result<()> {
//! let collector = Collector::new(ChromeLauncher::new(), CollectorConfig::default());
//! let courses = collector.collect(DEFAULT_COURSES_URL, Some(5)).await.into_records();
//!
//! let embedder = LocalEmbedder::new_with_default_model()?;
//! let index = InMemoryCourseIndex::build(&courses, embedder)?;
//!
//! FormServer::new(SemanticFrontEnd::new(index))
//!     .serve("127.0.0.1:7860".parse()?)
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod traits;
pub use traits::{CourseDocument, CourseRecord, CourseSearch, SearchHit, TextEmbedder};

pub mod config;
pub use config::{
    CourseScoutDirs, DEFAULT_BIND_ADDR, DEFAULT_CATALOG_LIMIT, DEFAULT_COURSES_URL,
    DEFAULT_SEMANTIC_LIMIT, DEFAULT_TOP_K,
};

pub mod embed;
pub use embed::LocalEmbedder;

pub mod engines;
pub use engines::{InMemoryCourseIndex, JsonCourseStore, StoreError};

pub mod collect;
pub use collect::{
    ChromeLauncher, CollectError, Collector, CollectorConfig, ExtractionPolicy, ScrapeOutcome,
};

pub mod form;
pub use form::{FormServer, OutputKind, QueryHandler};

pub mod search;
pub use search::{CatalogFrontEnd, NO_MATCHES, SemanticFrontEnd};
