//! Product extraction from the rendered new-arrivals page.
//!
//! The page groups products under `h2.section_divider` headings. Each heading
//! is followed by a `ul.sherpaList` whose items hold `span.offerCard_caption`
//! captions with the title, description and price.

use anyhow::{Context, Result, anyhow};
use scraper::{ElementRef, Html, Selector};

const HEADING: &str = "h2.section_divider";
const LIST_CLASS: &str = "sherpaList";
const CAPTION_CLASS: &str = "offerCard_caption";

/// One product row as it is stored in the `products` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    /// Category label, stored in the `type` column.
    pub category: String,
    pub title: String,
    /// Kept as displayed, currency symbol included.
    pub price: String,
    pub description: String,
}

/// A category heading and the products listed under it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub category: String,
    pub products: Vec<Product>,
}

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("Hardcoded selector should be valid.")
}

/// Extracts every category section from a full HTML document.
///
/// # Errors
///
/// Returns an error if a heading has no link or a caption lacks its title,
/// description or price node.
pub fn extract_sections(html: &str) -> Result<Vec<Section>> {
    extract_sections_with(html, |_| {})
}

/// Like [`extract_sections`], calling `on_section` as soon as each section is
/// complete. Sections handed over before a fault stay handed over.
pub fn extract_sections_with(
    html: &str,
    mut on_section: impl FnMut(&Section),
) -> Result<Vec<Section>> {
    let document = Html::parse_document(html);
    let heading_sel = selector(HEADING);
    let link_sel = selector("a");
    let item_sel = selector("li");
    let span_sel = selector("span");

    let mut sections = Vec::new();
    for heading in document.select(&heading_sel) {
        let category = heading
            .select(&link_sel)
            .next()
            .map(|a| text_of(a).trim().to_string())
            .ok_or_else(|| anyhow!("section heading has no <a> element"))?;

        let Some(list) = next_product_list(heading) else {
            log::debug!("No product list follows section {category:?}");
            let section = Section {
                category,
                products: Vec::new(),
            };
            on_section(&section);
            sections.push(section);
            continue;
        };

        let mut products = Vec::new();
        for item in list.select(&item_sel) {
            for caption in item.select(&span_sel).filter(|s| is_caption(*s)) {
                let product = parse_caption(caption, &category)
                    .with_context(|| format!("malformed product caption in {category:?}"))?;
                products.push(product);
            }
        }

        let section = Section { category, products };
        on_section(&section);
        sections.push(section);
    }

    Ok(sections)
}

/// Extracts all products from a document, flattened in document order.
pub fn extract_products(html: &str) -> Result<Vec<Product>> {
    Ok(extract_sections(html)?
        .into_iter()
        .flat_map(|section| section.products)
        .collect())
}

/// Finds the first following sibling that is a `ul.sherpaList`.
fn next_product_list(heading: ElementRef<'_>) -> Option<ElementRef<'_>> {
    heading
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "ul" && el.value().classes().any(|c| c == LIST_CLASS))
}

/// Captions must carry exactly one class, `offerCard_caption`.
///
/// Reads the raw attribute: `classes()` de-duplicates, so a repeated
/// class would otherwise pass.
fn is_caption(span: ElementRef<'_>) -> bool {
    span.value()
        .attr("class")
        .is_some_and(|class| class.split_whitespace().eq([CAPTION_CLASS]))
}

fn parse_caption(caption: ElementRef<'_>, category: &str) -> Result<Product> {
    let title = first_text(caption, "p.offerCard_title")?;
    let description = first_text(caption, "p.offerCard_description")?;
    let price = first_text(caption, "span")?;

    Ok(Product {
        category: category.to_string(),
        title,
        price,
        description,
    })
}

fn first_text(scope: ElementRef<'_>, css: &str) -> Result<String> {
    scope
        .select(&selector(css))
        .next()
        .map(text_of)
        .ok_or_else(|| anyhow!("missing {css} element"))
}

fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect()
}
