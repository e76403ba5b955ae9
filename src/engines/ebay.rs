//! eBay listing search engine implementation.

use scraper::Html;

use crate::util::{element_text, force_https, selector, BROWSER_USER_AGENT};
use crate::{Engine, EngineCategory, EngineConfig, RequestSpec, Result, SearchQuery, SearchResult};

/// eBay's first list item is a template card, not a listing.
const PLACEHOLDER_TITLE: &str = "Shop on eBay";

/// eBay search engine.
pub struct Ebay {
    config: EngineConfig,
}

impl Ebay {
    /// Creates a new eBay engine.
    pub fn new() -> Self {
        Self {
            config: EngineConfig {
                name: "eBay".to_string(),
                shortcut: "ebay".to_string(),
                categories: vec![EngineCategory::Shopping],
                timeout: 10,
                enabled: true,
                paging: true,
                options: Vec::new(),
            },
        }
    }

    /// Creates with custom configuration.
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    fn parse_results(&self, html: &str) -> Result<Vec<SearchResult>> {
        let document = Html::parse_document(html);

        let item_selector = selector("li.s-item")?;
        let link_selector = selector("a.s-item__link")?;
        let title_selector = selector("[role=heading], .s-item__title")?;
        let subtitle_selector = selector(".s-item__subtitle, .SECONDARY_INFO")?;
        let price_selector = selector(".s-item__price")?;
        let shipping_selector = selector(".s-item__shipping, .s-item__logisticsCost")?;
        let location_selector = selector(".s-item__location, .s-item__itemLocation")?;
        let image_selector = selector("img.s-item__image-img, .s-item__image img")?;

        let mut results = Vec::new();

        for item in document.select(&item_selector) {
            let url = item
                .select(&link_selector)
                .next()
                .and_then(|a| a.value().attr("href"))
                .unwrap_or_default();

            let title = item
                .select(&title_selector)
                .map(element_text)
                .find(|t| !t.is_empty())
                .unwrap_or_default();
            let title = title.strip_prefix("New Listing").unwrap_or(&title).trim();
            if title == PLACEHOLDER_TITLE {
                continue;
            }

            let content = [&subtitle_selector, &price_selector, &shipping_selector, &location_selector]
                .into_iter()
                .filter_map(|sel| item.select(sel).next().map(element_text))
                .filter(|t| !t.is_empty())
                .collect::<Vec<_>>()
                .join(" | ");

            let Some(mut result) = SearchResult::checked(url, title, &content) else {
                continue;
            };
            if let Some(src) = item
                .select(&image_selector)
                .next()
                .and_then(|img| img.value().attr("src"))
                .filter(|src| src.starts_with("http"))
            {
                result = result.with_thumbnail(force_https(src));
            }
            results.push(result);
        }

        Ok(results)
    }
}

impl Default for Ebay {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine for Ebay {
    fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn request(&self, query: &SearchQuery) -> Result<RequestSpec> {
        query.validate()?;
        let url = format!(
            "https://www.ebay.com/sch/i.html?_nkw={}&_sacat=0&_pgn={}",
            urlencoding::encode(&query.query),
            query.page
        );
        Ok(RequestSpec::get(url).with_header("User-Agent", BROWSER_USER_AGENT))
    }

    fn parse(&self, body: &str, _query: &SearchQuery) -> Result<Vec<SearchResult>> {
        self.parse_results(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SearchError;

    const SAMPLE: &str = r#"
        <html><body><ul class="srp-results">
            <li class="s-item">
                <a class="s-item__link" href="https://ebay.com/itm/123"><div class="s-item__title"><span role="heading">Shop on eBay</span></div></a>
            </li>
            <li class="s-item s-item__pl-on-bottom">
                <div class="s-item__image"><img class="s-item__image-img" src="http://i.ebayimg.com/thumbs/1.jpg"></div>
                <a class="s-item__link" href="https://www.ebay.com/itm/111">
                    <div class="s-item__title"><span role="heading"><span class="LIGHT_HIGHLIGHT">New Listing</span>Mechanical Keyboard 87-key</span></div>
                </a>
                <div class="s-item__subtitle">Pre-Owned</div>
                <span class="s-item__price">$45.00</span>
                <span class="s-item__shipping">+$10.00 shipping</span>
                <span class="s-item__location">from Germany</span>
            </li>
            <li class="s-item">
                <a class="s-item__link" href="https://www.ebay.com/itm/222">
                    <div class="s-item__title"><span role="heading">USB-C Cable</span></div>
                </a>
                <span class="s-item__price">$5.99</span>
            </li>
            <li class="s-item">
                <div class="s-item__title"><span role="heading">No link</span></div>
            </li>
        </ul></body></html>
    "#;

    #[test]
    fn test_ebay_new() {
        let engine = Ebay::new();
        assert_eq!(engine.name(), "eBay");
        assert_eq!(engine.shortcut(), "ebay");
        assert_eq!(engine.config().categories, vec![EngineCategory::Shopping]);
    }

    #[test]
    fn test_request() {
        let spec = Ebay::new()
            .request(&SearchQuery::new("mechanical keyboard").with_page(2))
            .unwrap();
        assert_eq!(
            spec.url,
            "https://www.ebay.com/sch/i.html?_nkw=mechanical%20keyboard&_sacat=0&_pgn=2"
        );
        assert_eq!(spec.header("User-Agent"), Some(BROWSER_USER_AGENT));
    }

    #[test]
    fn test_request_rejects_page_zero() {
        let result = Ebay::new().request(&SearchQuery::new("keyboard").with_page(0));
        assert!(matches!(result, Err(SearchError::InvalidQuery(_))));
    }

    #[test]
    fn test_parse() {
        let results = Ebay::new().parse(SAMPLE, &SearchQuery::new("keyboard")).unwrap();
        assert_eq!(results.len(), 2);

        assert_eq!(results[0].title, "Mechanical Keyboard 87-key");
        assert_eq!(results[0].url, "https://www.ebay.com/itm/111");
        assert_eq!(
            results[0].content,
            "Pre-Owned | $45.00 | +$10.00 shipping | from Germany"
        );
        assert_eq!(results[0].thumbnail.as_deref(), Some("https://i.ebayimg.com/thumbs/1.jpg"));

        assert_eq!(results[1].title, "USB-C Cable");
        assert_eq!(results[1].content, "$5.99");
        assert!(results[1].thumbnail.is_none());
    }

    #[test]
    fn test_parse_empty() {
        let engine = Ebay::new();
        let query = SearchQuery::new("x");
        assert!(engine.parse("<html><body></body></html>", &query).unwrap().is_empty());
        assert!(engine.parse_response("\u{0}\u{1}garbage", &query).is_empty());
    }
}
