use super::{BrowserLauncher, BrowserSession, CollectError, ListingCard};
use async_trait::async_trait;
use chromiumoxide::{Browser, BrowserConfig, Element, Page};
use futures::StreamExt;
use log::{debug, info};
use std::time::Duration;
use tokio::task::JoinHandle;

/// Launches a local headless Chromium for each scrape run.
#[derive(Debug, Clone)]
pub struct ChromeLauncher {
    request_timeout: Duration,
}

impl ChromeLauncher {
    pub fn new() -> Self {
        ChromeLauncher {
            request_timeout: Duration::from_secs(30),
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

impl Default for ChromeLauncher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BrowserLauncher for ChromeLauncher {
    type Session = ChromeSession;

    async fn launch(&self) -> Result<ChromeSession, CollectError> {
        // BrowserConfig runs headless unless with_head() is requested
        let config = BrowserConfig::builder()
            .no_sandbox()
            .request_timeout(self.request_timeout)
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .build()
            .map_err(CollectError::Launch)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| CollectError::Launch(e.to_string()))?;

        // The CDP event loop must be driven for any browser call to complete
        let events = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                let session = ChromeSession {
                    browser,
                    page: None,
                    events,
                };
                let _ = session.quit().await;
                return Err(CollectError::Launch(e.to_string()));
            }
        };

        info!("Launched headless browser");
        Ok(ChromeSession {
            browser,
            page: Some(page),
            events,
        })
    }
}

pub struct ChromeSession {
    browser: Browser,
    page: Option<Page>,
    events: JoinHandle<()>,
}

impl ChromeSession {
    fn page(&self) -> Result<&Page, CollectError> {
        self.page
            .as_ref()
            .ok_or_else(|| CollectError::Driver("browser has no open page".to_string()))
    }
}

#[async_trait]
impl BrowserSession for ChromeSession {
    type Card = ChromeCard;

    async fn goto(&mut self, url: &str) -> Result<(), CollectError> {
        self.page()?
            .goto(url)
            .await
            .map_err(|e| CollectError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        debug!("Navigated to {}", url);
        Ok(())
    }

    async fn find_all(&self, selector: &str) -> Result<Vec<ChromeCard>, CollectError> {
        let elements = self
            .page()?
            .find_elements(selector)
            .await
            .map_err(|e| CollectError::Driver(e.to_string()))?;
        Ok(elements.into_iter().map(|element| ChromeCard { element }).collect())
    }

    async fn quit(mut self) -> Result<(), CollectError> {
        let closed = self
            .browser
            .close()
            .await
            .map_err(|e| CollectError::Driver(e.to_string()));
        if closed.is_ok() {
            let _ = self.browser.wait().await;
        }
        self.events.abort();
        debug!("Browser session closed");
        closed.map(|_| ())
    }
}

pub struct ChromeCard {
    element: Element,
}

impl ChromeCard {
    async fn child(&self, selector: &str) -> Result<Element, CollectError> {
        self.element
            .find_element(selector)
            .await
            .map_err(|e| CollectError::Lookup {
                selector: selector.to_string(),
                message: e.to_string(),
            })
    }
}

#[async_trait]
impl ListingCard for ChromeCard {
    async fn text(&self, selector: &str) -> Result<Option<String>, CollectError> {
        self.child(selector)
            .await?
            .inner_text()
            .await
            .map_err(|e| CollectError::Driver(e.to_string()))
    }

    async fn attribute(
        &self,
        selector: &str,
        name: &str,
    ) -> Result<Option<String>, CollectError> {
        self.child(selector)
            .await?
            .attribute(name)
            .await
            .map_err(|e| CollectError::Driver(e.to_string()))
    }
}
