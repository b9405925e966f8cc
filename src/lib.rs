//! # Beautylish Scrape
//!
//! Scrapes the Beautylish new-arrivals listing into a local SQLite database.
//!
//! A single run:
//!
//! 1. Creates the `products` table in `products.db`.
//! 2. Loads the listing in a headless Firefox via WebDriver, so that
//!    JavaScript-rendered content is present.
//! 3. Extracts every product, grouped by category, and stores one row per
//!    product in a single transaction.
//! 4. Saves the raw page source to `beautylish.html`.
//!
//! ## Example
//!
//! ```no_run
//! use beautylish_scrape::{ScrapeConfig, run};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let report = run(&ScrapeConfig::default()).await?;
//!     println!("Stored {} products", report.rows);
//!     Ok(())
//! }
//! ```

pub mod browser;
pub mod product;
pub mod store;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::fs;

pub use browser::{Browser, DEFAULT_WEBDRIVER_URL, PageSource};
pub use product::{
    Product, Section, extract_products, extract_sections, extract_sections_with,
};
pub use store::ProductStore;

/// Where to scrape from and where to put the results.
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    pub webdriver_url: String,
    pub target_url: String,
    pub database_path: PathBuf,
    pub html_path: PathBuf,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            webdriver_url: DEFAULT_WEBDRIVER_URL.to_string(),
            target_url: "https://www.beautylish.com/new-arrivals".to_string(),
            database_path: PathBuf::from("products.db"),
            html_path: PathBuf::from("beautylish.html"),
        }
    }
}

/// Outcome of a completed scrape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrapeReport {
    pub sections: usize,
    pub rows: usize,
}

/// Runs the whole scrape against a real browser and the configured database.
///
/// The table is created before the browser starts, so a database that
/// already holds it fails the run without launching a browser.
pub async fn run(config: &ScrapeConfig) -> Result<ScrapeReport> {
    let store = ProductStore::open(&config.database_path)?;
    store.create_table()?;

    let mut browser = Browser::connect(&config.webdriver_url).await?;
    let report = scrape(config, &mut browser, store).await;
    let quit = browser.quit().await;

    settle(report, quit)
}

/// Combines the scrape outcome with the browser shutdown. A scrape error wins
/// over a failed shutdown, which is then only logged.
fn settle(report: Result<ScrapeReport>, quit: Result<()>) -> Result<ScrapeReport> {
    match (report, quit) {
        (Ok(report), quit) => quit.map(|()| report),
        (Err(e), Ok(())) => Err(e),
        (Err(e), Err(quit_err)) => {
            log::warn!("Failed to quit browser after error: {quit_err:#}");
            Err(e)
        }
    }
}

/// Fetches the target page, stores its products and writes the snapshot.
///
/// Expects the `products` table to exist. The connection is closed once the
/// rows are committed, before the HTML is written.
pub async fn scrape<S: PageSource>(
    config: &ScrapeConfig,
    source: &mut S,
    mut store: ProductStore,
) -> Result<ScrapeReport> {
    let html = source.fetch(&config.target_url).await?;

    let mut products = Vec::new();
    let sections = extract_sections_with(&html, |section| {
        print!("{}", format_section(section));
        products.extend_from_slice(&section.products);
    })?;
    log::info!("Extracted {} sections", sections.len());

    let rows = store.insert_all(&products)?;
    log::info!("Committed {rows} products");
    store.close()?;

    write_snapshot(&config.html_path, &html).await?;

    Ok(ScrapeReport {
        sections: sections.len(),
        rows,
    })
}

/// Writes the page source to `path`, replacing any previous snapshot.
pub async fn write_snapshot(path: &Path, html: &str) -> Result<()> {
    fs::write(path, html.as_bytes())
        .await
        .with_context(|| format!("failed to write {}", path.display()))?;
    log::info!("Saved HTML to {}", path.display());
    Ok(())
}

/// Console listing for one section: a dashed banner, then one line per product.
fn format_section(section: &Section) -> String {
    let rule = "-".repeat(30);
    let mut out = format!("\n{rule}{}{rule}\n\n", section.category);
    for product in &section.products {
        out.push_str(&format!(
            "{}\t\t{}\t\t\t\t{}\n",
            product.title, product.description, product.price
        ));
    }
    out
}
