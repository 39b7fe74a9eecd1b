use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_8};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE, USER_AGENT};
use reqwest::{Client, ClientBuilder};
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::extract::{extract_visible_text, MAX_TEXT_CHARS};

const FETCH_TIMEOUT: Duration = Duration::from_secs(15);

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; rv:109.0) Gecko/20100101 Firefox/119.0";
const BROWSER_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
const BROWSER_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.5";

static URL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^https?://").expect("Failed to compile URL pattern")
});

/// Any failure to retrieve a page. Timeouts, refused connections and error
/// statuses are deliberately not told apart.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    RequestFailure(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::RequestFailure(err.to_string())
    }
}

/// Only checks the scheme prefix; reachability is left to the fetch itself.
pub fn is_url(s: &str) -> bool {
    URL_PATTERN.is_match(s.trim())
}

/// Encoding named by the `charset` parameter of `Content-Type`, if recognised.
pub fn declared_charset(headers: &HeaderMap) -> Option<&'static Encoding> {
    let content_type = headers.get(CONTENT_TYPE)?.to_str().ok()?;
    content_type.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        if name.trim().eq_ignore_ascii_case("charset") {
            Encoding::for_label(value.trim().trim_matches('"').as_bytes())
        } else {
            None
        }
    })
}

/// Decode a page body with the declared encoding, else a detected one.
/// A byte-order mark overrides both.
pub fn decode_body(bytes: &[u8], declared: Option<&'static Encoding>) -> String {
    let encoding = declared.unwrap_or_else(|| detect_encoding(bytes));
    let (text, _, _) = encoding.decode(bytes);
    text.into_owned()
}

fn detect_encoding(bytes: &[u8]) -> &'static Encoding {
    if bytes.is_empty() {
        return UTF_8;
    }
    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    detector.guess(None, true)
}

#[derive(Clone)]
pub struct PageFetcher {
    client: Client,
}

impl PageFetcher {
    pub fn new() -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
        headers.insert(ACCEPT, HeaderValue::from_static(BROWSER_ACCEPT));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(BROWSER_ACCEPT_LANGUAGE));

        let client = ClientBuilder::new()
            .default_headers(headers)
            .timeout(FETCH_TIMEOUT)
            .build()?;

        Ok(Self { client })
    }

    /// Fetch `url` and return its visible text, capped at [`MAX_TEXT_CHARS`].
    pub async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        debug!(url, "fetching page");
        let start = Instant::now();

        let response = self.client.get(url).send().await?.error_for_status()?;

        let declared = declared_charset(response.headers());
        let bytes = response.bytes().await?;
        let html = decode_body(&bytes, declared);
        let text = extract_visible_text(&html, MAX_TEXT_CHARS);

        info!(
            url,
            html_bytes = bytes.len(),
            text_chars = text.chars().count(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "page fetched"
        );
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_url_accepts_http_and_https() {
        assert!(is_url("http://example.com"));
        assert!(is_url("https://example.com/page?q=1"));
        assert!(is_url("HTTPS://EXAMPLE.COM"));
        assert!(is_url("  https://example.com  "));
    }

    #[test]
    fn test_is_url_rejects_other_schemes() {
        assert!(!is_url("ftp://example.com"));
        assert!(!is_url("file:///etc/passwd"));
        assert!(!is_url("example.com"));
        assert!(!is_url("javascript:alert(1)"));
        assert!(!is_url("see https://example.com"));
    }

    fn headers_with(content_type: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_str(content_type).unwrap());
        headers
    }

    #[test]
    fn test_declared_charset() {
        let latin1 = declared_charset(&headers_with("text/html; charset=ISO-8859-1"));
        assert_eq!(latin1, Some(encoding_rs::WINDOWS_1252));

        let quoted = declared_charset(&headers_with("text/html;charset=\"utf-8\""));
        assert_eq!(quoted, Some(UTF_8));

        assert_eq!(declared_charset(&headers_with("text/html")), None);
        assert_eq!(declared_charset(&headers_with("text/html; charset=bogus")), None);
        assert_eq!(declared_charset(&HeaderMap::new()), None);
    }

    #[test]
    fn test_decode_undeclared_windows_1252() {
        let body = b"<html><head><meta charset=\"windows-1252\"></head>\
            <body><p>Caf\xe9 cr\xe8me br\xfbl\xe9e r\xe9sum\xe9</p></body></html>";
        let html = decode_body(body, None);
        assert!(html.contains("Caf\u{e9} cr\u{e8}me br\u{fb}l\u{e9}e r\u{e9}sum\u{e9}"), "got: {}", html);
    }

    #[test]
    fn test_decode_undeclared_utf8() {
        let body = "<p>na\u{ef}ve caf\u{e9} \u{65e5}\u{672c}</p>".as_bytes();
        assert_eq!(decode_body(body, None), "<p>na\u{ef}ve caf\u{e9} \u{65e5}\u{672c}</p>");
    }

    #[test]
    fn test_declared_charset_wins_over_detection() {
        let body = b"<p>Caf\xe9</p>";
        assert_eq!(decode_body(body, Some(encoding_rs::WINDOWS_1252)), "<p>Caf\u{e9}</p>");
        assert_eq!(decode_body(b"", None), "");
    }

    #[tokio::test]
    async fn test_unreachable_host_is_request_failure() {
        let fetcher = PageFetcher::new().unwrap();
        let result = fetcher.fetch_text("http://127.0.0.1:1/").await;
        assert!(matches!(result, Err(FetchError::RequestFailure(_))));
    }
}
