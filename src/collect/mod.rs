//! Scrapes course cards from a listing page through a headless browser.
//!
//! The browser is reached through the [`BrowserLauncher`], [`BrowserSession`]
//! and [`ListingCard`] traits; [`chrome`] implements them with chromiumoxide.
//! A session is owned by a single [`Collector::collect`] call and is quit on
//! every path out of it.

pub mod chrome;

pub use chrome::ChromeLauncher;

use crate::config::DEFAULT_WAIT_TIMEOUT;
use crate::traits::CourseRecord;
use async_trait::async_trait;
use log::{debug, error, info, warn};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CollectError {
    #[error("failed to launch browser: {0}")]
    Launch(String),
    #[error("failed to navigate to {url}: {message}")]
    Navigation { url: String, message: String },
    #[error("element '{selector}' not found: {message}")]
    Lookup { selector: String, message: String },
    #[error("browser driver error: {0}")]
    Driver(String),
}

/// Starts fresh browser sessions.
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    type Session: BrowserSession;

    async fn launch(&self) -> Result<Self::Session, CollectError>;
}

/// One open browser with a single page.
#[async_trait]
pub trait BrowserSession: Send + Sync {
    type Card: ListingCard;

    async fn goto(&mut self, url: &str) -> Result<(), CollectError>;

    /// All elements currently matching `selector`, possibly none.
    async fn find_all(&self, selector: &str) -> Result<Vec<Self::Card>, CollectError>;

    async fn quit(self) -> Result<(), CollectError>;
}

/// A rendered listing element whose sub-elements can be queried.
#[async_trait]
pub trait ListingCard: Send + Sync {
    /// Visible text of the first descendant matching `selector`.
    async fn text(&self, selector: &str) -> Result<Option<String>, CollectError>;

    /// Attribute `name` of the first descendant matching `selector`.
    async fn attribute(&self, selector: &str, name: &str)
    -> Result<Option<String>, CollectError>;
}

/// CSS selectors locating the card and each field inside it.
#[derive(Debug, Clone)]
pub struct CardSelectors {
    pub card: String,
    pub title: String,
    pub description: String,
    pub lessons: String,
    pub price: String,
    pub image: String,
}

impl Default for CardSelectors {
    fn default() -> Self {
        // The listing page has no separate description element, so the card body is reused
        CardSelectors {
            card: ".course-card".to_string(),
            title: ".course-card__body".to_string(),
            description: ".course-card__body".to_string(),
            lessons: ".course-card__lesson-count".to_string(),
            price: ".course-card__price".to_string(),
            image: "img".to_string(),
        }
    }
}

/// What to do when a field lookup fails on one card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtractionPolicy {
    /// Drop that card and carry on with the rest.
    #[default]
    SkipRecord,
    /// Stop, keeping the cards extracted so far.
    AbortBatch,
}

#[derive(Debug, Clone)]
pub struct CollectorConfig {
    pub wait_timeout: Duration,
    pub poll_interval: Duration,
    pub policy: ExtractionPolicy,
    pub selectors: CardSelectors,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        CollectorConfig {
            wait_timeout: DEFAULT_WAIT_TIMEOUT,
            poll_interval: Duration::from_millis(500),
            policy: ExtractionPolicy::default(),
            selectors: CardSelectors::default(),
        }
    }
}

/// Result of one scrape run.
#[derive(Debug)]
pub enum ScrapeOutcome {
    Complete {
        records: Vec<CourseRecord>,
        skipped: usize,
    },
    /// A lookup failed under [`ExtractionPolicy::AbortBatch`].
    Aborted {
        records: Vec<CourseRecord>,
        error: CollectError,
    },
    /// No listing card appeared before the wait timeout.
    TimedOut,
    /// The browser could not be launched or could not load the page.
    Failed(CollectError),
}

impl ScrapeOutcome {
    pub fn records(&self) -> &[CourseRecord] {
        match self {
            ScrapeOutcome::Complete { records, .. } | ScrapeOutcome::Aborted { records, .. } => {
                records
            }
            ScrapeOutcome::TimedOut | ScrapeOutcome::Failed(_) => &[],
        }
    }

    pub fn into_records(self) -> Vec<CourseRecord> {
        match self {
            ScrapeOutcome::Complete { records, .. } | ScrapeOutcome::Aborted { records, .. } => {
                records
            }
            ScrapeOutcome::TimedOut | ScrapeOutcome::Failed(_) => Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.records().is_empty()
    }

    pub fn skipped(&self) -> usize {
        match self {
            ScrapeOutcome::Complete { skipped, .. } => *skipped,
            _ => 0,
        }
    }
}

enum WaitResult<C> {
    Ready(Vec<C>),
    TimedOut,
}

pub struct Collector<L: BrowserLauncher> {
    launcher: L,
    config: CollectorConfig,
}

impl<L: BrowserLauncher> Collector<L> {
    pub fn new(launcher: L, config: CollectorConfig) -> Self {
        Collector { launcher, config }
    }

    pub fn config(&self) -> &CollectorConfig {
        &self.config
    }

    /// Scrapes up to `limit` course cards from `url`.
    ///
    /// Never returns an error: launch, navigation and timeout failures are
    /// logged and reported as [`ScrapeOutcome`] variants with no records.
    pub async fn collect(&self, url: &str, limit: Option<usize>) -> ScrapeOutcome {
        let mut session = match self.launcher.launch().await {
            Ok(session) => session,
            Err(e) => {
                error!("Error: {}", e);
                return ScrapeOutcome::Failed(e);
            }
        };

        let outcome = self.scrape_page(&mut session, url, limit).await;

        if let Err(e) = session.quit().await {
            warn!("Failed to quit browser session: {}", e);
        }

        match &outcome {
            ScrapeOutcome::Complete { records, skipped } => {
                info!("Scraped {} courses from {} ({} skipped)", records.len(), url, skipped)
            }
            ScrapeOutcome::Aborted { records, error } => {
                error!("Error scraping courses: {} (kept {})", error, records.len())
            }
            ScrapeOutcome::TimedOut => error!(
                "Error: no '{}' element appeared on {} within {:?}",
                self.config.selectors.card, url, self.config.wait_timeout
            ),
            ScrapeOutcome::Failed(e) => error!("Error: {}", e),
        }
        outcome
    }

    async fn scrape_page(
        &self,
        session: &mut L::Session,
        url: &str,
        limit: Option<usize>,
    ) -> ScrapeOutcome {
        if let Err(e) = session.goto(url).await {
            return ScrapeOutcome::Failed(e);
        }

        let cards = match self.wait_for_cards(session).await {
            Ok(WaitResult::Ready(cards)) => cards,
            Ok(WaitResult::TimedOut) => return ScrapeOutcome::TimedOut,
            Err(e) => return ScrapeOutcome::Failed(e),
        };

        let limit = limit.unwrap_or(usize::MAX);
        let mut records = Vec::new();
        let mut skipped = 0;

        for (i, card) in cards.iter().take(limit).enumerate() {
            match self.extract_record(card).await {
                Ok(record) => {
                    debug!("Card {}: {}", i, record.title);
                    records.push(record);
                }
                Err(error) => match self.config.policy {
                    ExtractionPolicy::SkipRecord => {
                        warn!("Skipping card {}: {}", i, error);
                        skipped += 1;
                    }
                    ExtractionPolicy::AbortBatch => {
                        return ScrapeOutcome::Aborted { records, error };
                    }
                },
            }
        }

        ScrapeOutcome::Complete { records, skipped }
    }

    /// Polls until at least one card is present or the wait timeout elapses.
    async fn wait_for_cards(
        &self,
        session: &L::Session,
    ) -> Result<WaitResult<<L::Session as BrowserSession>::Card>, CollectError> {
        match tokio::time::timeout(self.config.wait_timeout, self.poll_cards(session)).await {
            Ok(cards) => Ok(WaitResult::Ready(cards?)),
            Err(_) => Ok(WaitResult::TimedOut),
        }
    }

    async fn poll_cards(
        &self,
        session: &L::Session,
    ) -> Result<Vec<<L::Session as BrowserSession>::Card>, CollectError> {
        loop {
            let cards = session.find_all(&self.config.selectors.card).await?;
            if !cards.is_empty() {
                return Ok(cards);
            }
            tokio::time::sleep(self.config.poll_interval).await;
        }
    }

    async fn extract_record(
        &self,
        card: &<L::Session as BrowserSession>::Card,
    ) -> Result<CourseRecord, CollectError> {
        let selectors = &self.config.selectors;
        let title = card.text(&selectors.title).await?;
        let description = card.text(&selectors.description).await?;
        let lessons = card.text(&selectors.lessons).await?;
        let price = card.text(&selectors.price).await?;
        let image_url = card.attribute(&selectors.image, "src").await?;

        Ok(CourseRecord::from_raw(
            title,
            description,
            lessons,
            price,
            image_url,
        ))
    }
}
