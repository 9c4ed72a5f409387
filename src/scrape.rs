//! Image link discovery
//!
//! Enumerates `img` elements in document order and keeps the ones that look
//! like page content: a `jpg`/`jpeg`/`png` source whose file name contains a
//! digit. UI chrome (logos, icons, spacers) is almost always digit-free,
//! which is what makes the heuristic site-agnostic.

use crate::types::ImageCandidate;
use scraper::{Html, Selector};
use std::sync::OnceLock;
use tracing::{debug, warn};
use url::Url;

const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

#[allow(clippy::expect_used)] // static selector text, cannot fail
fn img_selector() -> &'static Selector {
    static SELECTOR: OnceLock<Selector> = OnceLock::new();
    SELECTOR.get_or_init(|| Selector::parse("img").expect("valid selector"))
}

/// Extract qualifying image candidates from an HTML document
///
/// Candidates carry their position among **all** `img` tags as `index`, so
/// indices are strictly increasing but not contiguous when tags are
/// filtered out. Extraction is stateless; re-running on the same document
/// yields the same candidates.
pub fn extract_image_links(html: &str, base: &Url) -> Vec<ImageCandidate> {
    let document = Html::parse_document(html);
    let mut candidates = Vec::new();

    for (index, element) in document.select(img_selector()).enumerate() {
        let Some(src) = element.value().attr("src") else {
            continue;
        };
        if !has_image_extension(src) {
            continue;
        }
        if !base_name(src).chars().any(|c| c.is_ascii_digit()) {
            // Digit-free file names are UI chrome, not page content.
            continue;
        }

        let url = match base.join(src) {
            Ok(url) => url,
            Err(e) => {
                warn!(src, error = %e, "skipping unresolvable image reference");
                continue;
            }
        };

        candidates.push(ImageCandidate {
            src: src.to_string(),
            url,
            index,
        });
    }

    debug!(count = candidates.len(), "extracted image candidates");
    candidates
}

fn has_image_extension(src: &str) -> bool {
    let lower = src.to_ascii_lowercase();
    IMAGE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

fn base_name(src: &str) -> &str {
    src.rsplit('/').next().unwrap_or(src)
}
