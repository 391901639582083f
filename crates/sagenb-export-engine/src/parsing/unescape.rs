//! Reversal of the worksheet text escaping.
//!
//! SageNB stores cell text HTML-escaped so that user content can never be
//! mistaken for a cell marker. The parser only ever unescapes a run after it
//! has been segmented, so an unescaper is free to produce marker-shaped text.

#[derive(Debug, thiserror::Error)]
#[error("cannot unescape {sequence:?}: {reason}")]
pub struct UnescapeError {
    pub sequence: String,
    pub reason: String,
}

/// Turns an escaped run of worksheet text into its logical content.
///
/// Implementations must leave text without escape sequences unchanged.
pub trait Unescape {
    fn unescape(&self, raw: &str) -> Result<String, UnescapeError>;
}

impl<F> Unescape for F
where
    F: Fn(&str) -> Result<String, UnescapeError>,
{
    fn unescape(&self, raw: &str) -> Result<String, UnescapeError> {
        self(raw)
    }
}

/// Decodes HTML character references (`&lt;`, `&#123;`, `&#x7b;`, ...).
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlUnescape;

impl Unescape for HtmlUnescape {
    fn unescape(&self, raw: &str) -> Result<String, UnescapeError> {
        Ok(html_escape::decode_html_entities(raw).into_owned())
    }
}
