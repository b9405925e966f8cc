//! Headless browser session used to load JavaScript-rendered pages.

use anyhow::{Context, Result};
use async_trait::async_trait;
use thirtyfour::{DesiredCapabilities, WebDriver};

/// Default address of a locally running geckodriver.
pub const DEFAULT_WEBDRIVER_URL: &str = "http://127.0.0.1:4444";

/// Anything that can turn a URL into rendered HTML.
#[async_trait]
pub trait PageSource {
    /// Loads `url` and returns the page source after rendering.
    async fn fetch(&mut self, url: &str) -> Result<String>;
}

/// A headless Firefox session driven through WebDriver.
pub struct Browser {
    driver: WebDriver,
}

impl Browser {
    /// Starts a headless Firefox session.
    ///
    /// Requires geckodriver to be listening on `webdriver_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the WebDriver connection fails.
    pub async fn connect(webdriver_url: &str) -> Result<Self> {
        let mut caps = DesiredCapabilities::firefox();
        caps.set_headless()?;

        log::info!("Connecting to WebDriver at {webdriver_url}");
        let driver = WebDriver::new(webdriver_url, caps)
            .await
            .with_context(|| format!("failed to start browser session via {webdriver_url}"))?;

        Ok(Self { driver })
    }

    /// Ends the browser session.
    pub async fn quit(self) -> Result<()> {
        self.driver.quit().await?;
        Ok(())
    }
}

#[async_trait]
impl PageSource for Browser {
    async fn fetch(&mut self, url: &str) -> Result<String> {
        log::info!("Loading {url}");
        self.driver
            .goto(url)
            .await
            .with_context(|| format!("failed to load {url}"))?;

        let source = self.driver.source().await?;
        log::info!("Fetched {} bytes of HTML", source.len());
        Ok(source)
    }
}
