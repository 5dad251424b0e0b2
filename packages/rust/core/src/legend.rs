//! The coding legend appended after the transcript.

use transcoder_shared::{Category, Document, Paragraph, Run};

/// Title of the legend block.
pub const LEGEND_TITLE: &str = "Coding legend";

/// Text of the color sample in each legend entry.
const SWATCH_TEXT: &str = "example";

/// Append the legend: a bold title, then one entry per category in
/// taxonomy order with a shaded sample.
pub fn append_legend(document: &mut Document) {
    document.push(Paragraph::new(vec![Run::new(LEGEND_TITLE).bold()]));

    for category in Category::ALL {
        document.push(Paragraph::new(vec![
            Run::new(format!("{}. {} – ", category.code(), category.title())),
            Run::new(SWATCH_TEXT).shaded(category.color()),
        ]));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_title_and_eight_entries() {
        let mut document = Document::new(vec![Paragraph::new(vec![Run::new("body")])]);
        append_legend(&mut document);

        let paragraphs = document.paragraphs();
        assert_eq!(paragraphs.len(), 1 + 1 + 8);
        assert_eq!(paragraphs[0].text(), "body");

        let title = &paragraphs[1];
        assert_eq!(title.text(), LEGEND_TITLE);
        assert!(title.runs()[0].style().bold);
    }

    #[test]
    fn entries_follow_taxonomy_order_with_swatches() {
        let mut document = Document::default();
        append_legend(&mut document);

        for (paragraph, category) in document.paragraphs()[1..].iter().zip(Category::ALL) {
            assert!(paragraph.text().starts_with(&format!("{}. {}", category.code(), category.title())));
            let swatch = &paragraph.runs()[1];
            assert_eq!(swatch.text(), "example");
            assert_eq!(swatch.style().shading.as_deref(), Some(category.color()));
            assert_eq!(paragraph.runs()[0].style().shading, None);
        }
    }

    #[test]
    fn existing_paragraphs_are_untouched() {
        let original = Paragraph::new(vec![Run::new("shaded").shaded("FFF2CC")]);
        let mut document = Document::new(vec![original.clone()]);
        append_legend(&mut document);
        assert_eq!(document.paragraphs()[0], original);
    }
}
