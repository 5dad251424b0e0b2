//! Decoding the model's JSON payload into validated [`QuoteMatch`] records.
//!
//! The payload is decoded into an explicit schema first. Entries whose
//! category falls outside the taxonomy, and quotes that are blank, are
//! dropped here so nothing loosely-typed reaches the highlighter.

use serde::Deserialize;
use tracing::debug;

use transcoder_shared::{Category, QuoteMatch, Result, TranscoderError};

/// Top-level `{"matches": [...]}` object.
#[derive(Debug, Deserialize)]
struct CodingResponse {
    #[serde(default)]
    matches: Vec<CodedEntry>,
}

/// One `{"category": "A", "quotes": [...]}` entry.
#[derive(Debug, Deserialize)]
struct CodedEntry {
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    quotes: Vec<Option<String>>,
}

/// Parse a raw model payload into quote matches, in response order.
pub fn parse_matches(raw: &str) -> Result<Vec<QuoteMatch>> {
    let response: CodingResponse =
        serde_json::from_str(raw).map_err(|e| TranscoderError::malformed(e.to_string(), raw))?;

    let mut matches = Vec::new();
    for entry in response.matches {
        let code = entry.category.unwrap_or_default();
        let Some(category) = Category::parse(&code) else {
            debug!(category = %code, "dropping entry outside the taxonomy");
            continue;
        };

        for quote in entry.quotes.into_iter().flatten() {
            let quote = quote.trim();
            if !quote.is_empty() {
                matches.push(QuoteMatch::new(category, quote));
            }
        }
    }

    Ok(matches)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_category_code() {
        let matches =
            parse_matches(r#"{"matches":[{"category":"a","quotes":["Hello world"]}]}"#).unwrap();
        assert_eq!(matches, vec![QuoteMatch::new(Category::A, "Hello world")]);
    }

    #[test]
    fn drops_unknown_category() {
        let matches =
            parse_matches(r#"{"matches":[{"category":"Z","quotes":["Hello world"]}]}"#).unwrap();
        assert!(matches.is_empty());
    }

    #[test]
    fn drops_blank_and_null_quotes() {
        let raw = r#"{"matches":[{"category":" b ","quotes":["   ", null, "", "  kept  "]}]}"#;
        let matches = parse_matches(raw).unwrap();
        assert_eq!(matches, vec![QuoteMatch::new(Category::B, "kept")]);
    }

    #[test]
    fn missing_fields_are_tolerated() {
        assert!(parse_matches("{}").unwrap().is_empty());
        assert!(parse_matches(r#"{"matches":[{"quotes":["orphan"]}]}"#).unwrap().is_empty());
        assert!(parse_matches(r#"{"matches":[{"category":"C"}]}"#).unwrap().is_empty());
    }

    #[test]
    fn keeps_response_order_without_dedup() {
        let raw = r#"{"matches":[
            {"category":"H","quotes":["one","two"]},
            {"category":"D","quotes":["one"]}
        ]}"#;
        let matches = parse_matches(raw).unwrap();
        assert_eq!(
            matches,
            vec![
                QuoteMatch::new(Category::H, "one"),
                QuoteMatch::new(Category::H, "two"),
                QuoteMatch::new(Category::D, "one"),
            ]
        );
    }

    #[test]
    fn undecodable_payload_is_malformed() {
        let err = parse_matches("Sure! Here are the matches: ...").unwrap_err();
        match err {
            TranscoderError::MalformedResponse { raw, .. } => {
                assert_eq!(raw, "Sure! Here are the matches: ...");
            }
            other => panic!("expected MalformedResponse, got {other:?}"),
        }
    }

    #[test]
    fn schema_violation_is_malformed() {
        let err = parse_matches(r#"{"matches":"none"}"#).unwrap_err();
        assert!(matches!(err, TranscoderError::MalformedResponse { .. }));

        let err = parse_matches(r#""just a string""#).unwrap_err();
        assert!(matches!(err, TranscoderError::MalformedResponse { .. }));
    }
}
