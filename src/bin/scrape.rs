//! Scrapes the Beautylish new-arrivals page into `products.db`.
//!
//! Requires geckodriver to be running on port 4444. The run fails if
//! `products.db` already holds a `products` table.
//!
//! # Usage
//!
//! ```bash
//! geckodriver &
//! cargo run --bin scrape
//! RUST_LOG=debug cargo run --bin scrape  # More detail
//! ```

use beautylish_scrape::{ScrapeConfig, run};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let config = ScrapeConfig::default();
    let report = run(&config).await?;

    println!(
        "\nComplete! Stored {} products from {} sections.",
        report.rows, report.sections
    );
    println!("Page source saved to {}", config.html_path.display());

    Ok(())
}
