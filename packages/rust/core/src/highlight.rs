//! Locating classifier quotes in the document and shading them.
//!
//! Matching is a case-insensitive substring test against whole paragraphs,
//! and marking covers every run of a matching paragraph rather than the
//! exact quote span. A paragraph matched by several categories keeps the
//! color of the last match applied.

use tracing::{debug, instrument};

use transcoder_shared::{Category, Document, QuoteMatch};

/// Shade every paragraph that contains `quote` with the category's color.
///
/// Returns `true` if at least one paragraph was marked. Blank quotes and
/// quotes found nowhere are dropped without error.
pub fn highlight_quote(document: &mut Document, quote: &str, category: Category) -> bool {
    let needle = quote.trim().to_lowercase();
    if needle.is_empty() {
        return false;
    }

    let mut applied = false;
    for paragraph in document.paragraphs_mut() {
        let text = paragraph.text().trim();
        if text.is_empty() || !text.to_lowercase().contains(&needle) {
            continue;
        }

        for run in paragraph.runs_mut() {
            run.apply_shading(category.color());
        }
        applied = true;
    }

    applied
}

/// Apply every match in order and count those that marked something.
#[instrument(skip_all, fields(matches = matches.len()))]
pub fn apply_highlights(document: &mut Document, matches: &[QuoteMatch]) -> usize {
    let mut applied = 0;
    for m in matches {
        if highlight_quote(document, &m.quote, m.category) {
            applied += 1;
        } else {
            debug!(category = m.category.code(), quote = %m.quote, "quote not found in document");
        }
    }
    applied
}

#[cfg(test)]
mod tests {
    use transcoder_shared::{Paragraph, Run};

    use super::*;

    fn doc(paragraphs: &[&[&str]]) -> Document {
        Document::new(
            paragraphs
                .iter()
                .map(|runs| Paragraph::new(runs.iter().map(|r| Run::new(*r)).collect()))
                .collect(),
        )
    }

    fn fills(document: &Document, index: usize) -> Vec<Option<&str>> {
        document.paragraphs()[index]
            .runs()
            .iter()
            .map(|r| r.style().shading.as_deref())
            .collect()
    }

    #[test]
    fn case_insensitive_substring_marks_whole_paragraph() {
        let mut document = doc(&[&["The quick ", "Brown fox"], &["unrelated"]]);
        assert!(highlight_quote(&mut document, "brown fox", Category::C));
        assert_eq!(fills(&document, 0), vec![Some("E2F0D9"), Some("E2F0D9")]);
        assert_eq!(fills(&document, 1), vec![None]);
    }

    #[test]
    fn absent_quote_reports_false() {
        let mut document = doc(&[&["The quick Brown fox"]]);
        assert!(!highlight_quote(&mut document, "blue fox", Category::A));
        assert_eq!(fills(&document, 0), vec![None]);
    }

    #[test]
    fn blank_quote_is_ignored() {
        let mut document = doc(&[&["anything"]]);
        assert!(!highlight_quote(&mut document, "   ", Category::A));
    }

    #[test]
    fn quote_is_trimmed_before_matching() {
        let mut document = doc(&[&["we used viva exams"]]);
        assert!(highlight_quote(&mut document, "  viva exams\n", Category::B));
    }

    #[test]
    fn every_containing_paragraph_is_marked() {
        let mut document = doc(&[&["fairness matters"], &["blank"], &["Fairness again"]]);
        assert!(highlight_quote(&mut document, "fairness", Category::E));
        assert_eq!(fills(&document, 0), vec![Some("E4DFEC")]);
        assert_eq!(fills(&document, 1), vec![None]);
        assert_eq!(fills(&document, 2), vec![Some("E4DFEC")]);
    }

    #[test]
    fn reapplying_leaves_one_fill() {
        let mut document = doc(&[&["same words"]]);
        highlight_quote(&mut document, "same words", Category::D);
        highlight_quote(&mut document, "same words", Category::D);
        assert_eq!(fills(&document, 0), vec![Some("FCE4D6")]);
    }

    #[test]
    fn last_category_wins() {
        let mut document = doc(&[&["shared passage"]]);
        highlight_quote(&mut document, "shared", Category::A);
        highlight_quote(&mut document, "passage", Category::H);
        assert_eq!(fills(&document, 0), vec![Some("D5E8D4")]);
    }

    #[test]
    fn text_is_never_altered() {
        let mut document = doc(&[&["Keep ", "THIS"], &["and this"]]);
        let before = document.text_paragraphs();
        apply_highlights(
            &mut document,
            &[
                QuoteMatch::new(Category::A, "keep this"),
                QuoteMatch::new(Category::B, "and"),
            ],
        );
        assert_eq!(document.text_paragraphs(), before);
    }

    #[test]
    fn apply_counts_only_matches_that_landed() {
        let mut document = doc(&[&["alpha"], &["beta"]]);
        let applied = apply_highlights(
            &mut document,
            &[
                QuoteMatch::new(Category::A, "alpha"),
                QuoteMatch::new(Category::B, "gamma"),
                QuoteMatch::new(Category::C, "BETA"),
            ],
        );
        assert_eq!(applied, 2);
    }
}
