use std::io::Cursor;
use tracing::{debug, warn};
use url::Url;

use crate::error::{ReaderError, Result};

/// Placeholder base used when the page URL cannot be parsed for link resolution.
const FALLBACK_BASE_URL: &str = "http://localhost/";

/// Reduces a full HTML document to the fragment holding its main content.
pub trait ArticleExtractor: Send + Sync {
    /// Returns the main-content subtree of `document` serialized as HTML.
    /// `page_url` is only used to resolve relative links.
    fn extract(&self, document: &str, page_url: &str) -> Result<String>;
}

/// Extractor backed by the `readability` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReadabilityExtractor;

impl ArticleExtractor for ReadabilityExtractor {
    fn extract(&self, document: &str, page_url: &str) -> Result<String> {
        if document.trim().is_empty() {
            return Err(ReaderError::Extraction {
                url: page_url.to_string(),
                reason: "document is empty".to_string(),
            });
        }

        let base = base_url(page_url)?;
        let mut reader = Cursor::new(document.as_bytes());

        match readability::extractor::extract(&mut reader, &base) {
            Ok(product) => {
                debug!(
                    url = page_url,
                    title = %product.title,
                    chars = product.content.len(),
                    "extract: readability produced article"
                );
                Ok(product.content)
            }
            Err(e) => {
                warn!("extract: readability failed for {}: {}", page_url, e);
                Err(ReaderError::Extraction {
                    url: page_url.to_string(),
                    reason: e.to_string(),
                })
            }
        }
    }
}

fn base_url(page_url: &str) -> Result<Url> {
    Url::parse(page_url)
        .or_else(|_| Url::parse(FALLBACK_BASE_URL))
        .map_err(|e| ReaderError::Extraction {
            url: page_url.to_string(),
            reason: format!("no usable base url: {}", e),
        })
}
