//! Marketplace extractors and the page fetching they share

pub mod aliexpress;
pub mod fetch;
pub mod taobao;
pub mod web_search;

pub use aliexpress::AliExpressSource;
pub use fetch::{build_client, HttpFetcher, PageFetcher};
pub use taobao::TaobaoSource;
pub use web_search::{GoogleSearch, WebSearch};

use scraper::ElementRef;

/// Title used when a listing has none
pub const NO_TITLE: &str = "제목 없음";

/// Text of an element with each text node trimmed, then concatenated
pub(crate) fn stripped_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect()
}

/// Rewrite a protocol-relative URL (`//host/path`) to `https:`
pub(crate) fn secure_url(url: &str) -> String {
    if url.starts_with("//") {
        format!("https:{}", url)
    } else {
        url.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};

    #[test]
    fn test_stripped_text_joins_trimmed_nodes() {
        let html = Html::parse_fragment("<div>  US $ <span> 3 </span>.<b>20 </b></div>");
        let selector = Selector::parse("div").unwrap();
        let div = html.select(&selector).next().unwrap();
        assert_eq!(stripped_text(div), "US $3.20");
    }

    #[test]
    fn test_secure_url() {
        assert_eq!(secure_url("//ae01.alicdn.com/a.jpg"), "https://ae01.alicdn.com/a.jpg");
        assert_eq!(secure_url("https://a.com/x"), "https://a.com/x");
        assert_eq!(secure_url(""), "");
    }
}
