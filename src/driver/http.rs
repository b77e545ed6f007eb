//! HTTP-backed navigation driver
//!
//! Implements [`NavigationDriver`] over plain HTTP for server-rendered
//! targets: `navigate` fetches and parses the page, `find` runs a CSS
//! selector against the current document, `click` follows the element's
//! resolved `href`, and `wait_for` polls by re-fetching the current URL
//! until the selector matches or the deadline passes.
//!
//! Staleness is tracked with a document generation counter: every navigation
//! bumps the generation, and handles resolved against an older document are
//! rejected as stale.

use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use std::time::Duration;
use tokio::time::Instant;
use url::Url;

use super::{DriverError, DriverResult, ElementHandle, Lookup, NavigationDriver, Wait};

/// Interval between re-fetches while waiting for a selector
const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// One HTTP browsing session
pub struct HttpDriver {
    client: Client,
    body: Option<String>,
    current_url: Option<Url>,
    generation: u64,
}

impl HttpDriver {
    /// Builds a driver with its own HTTP client
    ///
    /// # Arguments
    ///
    /// * `user_agent` - Optional user agent override; defaults to the crate
    ///   name and version
    pub fn new(user_agent: Option<&str>) -> DriverResult<Self> {
        let agent = user_agent
            .map(str::to_string)
            .unwrap_or_else(|| format!("jobharvest/{}", env!("CARGO_PKG_VERSION")));

        let client = Client::builder()
            .user_agent(agent)
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .gzip(true)
            .brotli(true)
            .build()
            .map_err(|e| DriverError::Session(e.to_string()))?;

        Ok(Self {
            client,
            body: None,
            current_url: None,
            generation: 0,
        })
    }

    /// Fetches `url` and replaces the current document
    async fn load(&mut self, url: &str) -> DriverResult<()> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DriverError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DriverError::Navigation {
                url: url.to_string(),
                message: format!("HTTP {}", status.as_u16()),
            });
        }

        let final_url = response.url().clone();
        let body = response.text().await.map_err(|e| DriverError::Navigation {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        self.body = Some(body);
        self.current_url = Some(final_url);
        self.generation += 1;
        Ok(())
    }

    fn parse_selector(selector: &str) -> DriverResult<Selector> {
        Selector::parse(selector).map_err(|e| DriverError::InvalidSelector {
            selector: selector.to_string(),
            message: e.to_string(),
        })
    }

    /// Runs a closure over the first match of `selector` in the current
    /// document
    ///
    /// The parsed document never crosses an await point; `scraper::Html` is
    /// not `Send`.
    fn with_first_match<T>(
        &self,
        selector: &str,
        f: impl FnOnce(scraper::ElementRef<'_>) -> T,
    ) -> DriverResult<Option<T>> {
        let parsed = Self::parse_selector(selector)?;
        let body = match &self.body {
            Some(body) => body,
            None => return Ok(None),
        };

        let document = Html::parse_document(body);
        Ok(document.select(&parsed).next().map(f))
    }

    fn check_fresh(&self, element: &ElementHandle) -> DriverResult<()> {
        if element.generation() != self.generation {
            return Err(DriverError::StaleElement {
                selector: element.selector().to_string(),
            });
        }
        Ok(())
    }

    /// Resolves the activation target of an element: its own `href`, or a
    /// `data-href` attribute for script-activated cards
    fn activation_href(&self, element: &ElementHandle) -> DriverResult<String> {
        let href = self
            .with_first_match(element.selector(), |el| {
                el.value()
                    .attr("href")
                    .or_else(|| el.value().attr("data-href"))
                    .map(str::to_string)
            })?
            .flatten();

        let href = href.ok_or_else(|| DriverError::NotClickable {
            selector: element.selector().to_string(),
        })?;

        let resolved = match &self.current_url {
            Some(base) => base
                .join(&href)
                .map_err(|e| DriverError::Navigation {
                    url: href.clone(),
                    message: e.to_string(),
                })?
                .to_string(),
            None => href,
        };

        Ok(resolved)
    }
}

#[async_trait]
impl NavigationDriver for HttpDriver {
    async fn navigate(&mut self, url: &str) -> DriverResult<()> {
        tracing::debug!("Navigating to {}", url);
        self.load(url).await
    }

    async fn find(&mut self, selector: &str) -> DriverResult<Lookup> {
        match self.with_first_match(selector, |_| ())? {
            Some(()) => Ok(Lookup::Found(ElementHandle::new(selector, self.generation))),
            None => Ok(Lookup::NotFound),
        }
    }

    async fn click(&mut self, element: &ElementHandle) -> DriverResult<()> {
        self.check_fresh(element)?;
        let target = self.activation_href(element)?;
        tracing::debug!("Following {} via {}", target, element.selector());
        self.load(&target).await
    }

    async fn dispatch_click(&mut self, element: &ElementHandle) -> DriverResult<()> {
        // Plain HTTP has no overlay model, so the programmatic dispatch
        // resolves the same activation target as a direct click.
        self.click(element).await
    }

    async fn wait_for(&mut self, selector: &str, timeout: Duration) -> DriverResult<Wait> {
        let deadline = Instant::now() + timeout;

        loop {
            if self.with_first_match(selector, |_| ())?.is_some() {
                return Ok(Wait::Element(ElementHandle::new(selector, self.generation)));
            }

            let now = Instant::now();
            if now >= deadline {
                return Ok(Wait::TimedOut);
            }

            // A static document will not change on its own; re-fetch after a
            // short pause, bounded by the remaining budget.
            let pause = POLL_INTERVAL.min(deadline - now);
            tokio::time::sleep(pause).await;

            let url = match &self.current_url {
                Some(url) => url.to_string(),
                None => return Ok(Wait::TimedOut),
            };
            self.load(&url).await?;
        }
    }

    async fn text(&mut self, element: &ElementHandle) -> DriverResult<String> {
        self.check_fresh(element)?;
        let text = self
            .with_first_match(element.selector(), |el| {
                el.text().collect::<Vec<_>>().join(" ")
            })?
            .unwrap_or_default();
        Ok(text.split_whitespace().collect::<Vec<_>>().join(" "))
    }

    fn current_url(&self) -> Option<String> {
        self.current_url.as_ref().map(Url::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mock_page(server: &MockServer, page_path: &str, body: &str) {
        Mock::given(method("GET"))
            .and(path(page_path.to_string()))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(body.to_string())
                    .insert_header("content-type", "text/html"),
            )
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_navigate_and_find() {
        let server = MockServer::start().await;
        mock_page(
            &server,
            "/listing",
            r#"<html><body><div id="cards"><a id="job-card-0" href="/job/0">Engineer</a></div></body></html>"#,
        )
        .await;

        let mut driver = HttpDriver::new(None).unwrap();
        driver
            .navigate(&format!("{}/listing", server.uri()))
            .await
            .unwrap();

        assert!(matches!(
            driver.find("#job-card-0").await.unwrap(),
            Lookup::Found(_)
        ));
        assert_eq!(driver.find("#job-card-1").await.unwrap(), Lookup::NotFound);
    }

    #[tokio::test]
    async fn test_click_follows_href() {
        let server = MockServer::start().await;
        mock_page(
            &server,
            "/listing",
            r#"<html><body><a id="job-card-0" href="/job/0">Engineer</a></body></html>"#,
        )
        .await;
        mock_page(
            &server,
            "/job/0",
            r#"<html><body><h1 id="title">Engineer</h1></body></html>"#,
        )
        .await;

        let mut driver = HttpDriver::new(None).unwrap();
        driver
            .navigate(&format!("{}/listing", server.uri()))
            .await
            .unwrap();

        let card = match driver.find("#job-card-0").await.unwrap() {
            Lookup::Found(handle) => handle,
            other => panic!("expected card, got {:?}", other),
        };

        driver.click(&card).await.unwrap();
        assert_eq!(
            driver.current_url().unwrap(),
            format!("{}/job/0", server.uri())
        );

        let title = match driver.find("#title").await.unwrap() {
            Lookup::Found(handle) => handle,
            other => panic!("expected title, got {:?}", other),
        };
        assert_eq!(driver.text(&title).await.unwrap(), "Engineer");
    }

    #[tokio::test]
    async fn test_click_without_href_is_not_clickable() {
        let server = MockServer::start().await;
        mock_page(
            &server,
            "/listing",
            r#"<html><body><div id="job-card-0">Engineer</div></body></html>"#,
        )
        .await;

        let mut driver = HttpDriver::new(None).unwrap();
        driver
            .navigate(&format!("{}/listing", server.uri()))
            .await
            .unwrap();

        let card = match driver.find("#job-card-0").await.unwrap() {
            Lookup::Found(handle) => handle,
            other => panic!("expected card, got {:?}", other),
        };

        assert!(matches!(
            driver.click(&card).await,
            Err(DriverError::NotClickable { .. })
        ));
    }

    #[tokio::test]
    async fn test_handle_goes_stale_after_navigation() {
        let server = MockServer::start().await;
        mock_page(
            &server,
            "/a",
            r#"<html><body><a id="link" href="/b">next</a></body></html>"#,
        )
        .await;
        mock_page(&server, "/b", r#"<html><body>done</body></html>"#).await;

        let mut driver = HttpDriver::new(None).unwrap();
        driver.navigate(&format!("{}/a", server.uri())).await.unwrap();

        let link = match driver.find("#link").await.unwrap() {
            Lookup::Found(handle) => handle,
            other => panic!("expected link, got {:?}", other),
        };

        driver.navigate(&format!("{}/b", server.uri())).await.unwrap();

        assert!(matches!(
            driver.text(&link).await,
            Err(DriverError::StaleElement { .. })
        ));
    }

    #[tokio::test]
    async fn test_wait_for_times_out() {
        let server = MockServer::start().await;
        mock_page(&server, "/listing", r#"<html><body>empty</body></html>"#).await;

        let mut driver = HttpDriver::new(None).unwrap();
        driver
            .navigate(&format!("{}/listing", server.uri()))
            .await
            .unwrap();

        let outcome = driver
            .wait_for("#never", Duration::from_millis(50))
            .await
            .unwrap();
        assert_eq!(outcome, Wait::TimedOut);
    }

    #[tokio::test]
    async fn test_invalid_selector_is_rejected() {
        let mut driver = HttpDriver::new(None).unwrap();
        assert!(matches!(
            driver.find("p[unterminated").await,
            Err(DriverError::InvalidSelector { .. })
        ));
    }
}
