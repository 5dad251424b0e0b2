//! Owned, mutable document model.
//!
//! A [`Document`] is an ordered list of [`Paragraph`]s, each made of styled
//! [`Run`]s. Paragraph text is fixed at construction; only run styling can
//! change afterwards.

use serde::{Deserialize, Serialize};

/// Presentation of a single run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStyle {
    pub bold: bool,
    /// Solid background fill, `RRGGBB`.
    pub shading: Option<String>,
}

/// A span of text sharing one style.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Run {
    text: String,
    style: RunStyle,
}

impl Run {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: RunStyle::default(),
        }
    }

    /// Builder: mark the run bold.
    pub fn bold(mut self) -> Self {
        self.style.bold = true;
        self
    }

    /// Builder: shade the run.
    pub fn shaded(mut self, color: &str) -> Self {
        self.apply_shading(color);
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn style(&self) -> &RunStyle {
        &self.style
    }

    /// Replace whatever fill the run carries. A run holds at most one fill,
    /// so repeated application leaves only the latest color.
    pub fn apply_shading(&mut self, color: &str) {
        self.style.shading = Some(color.to_string());
    }
}

/// An addressable block of text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paragraph {
    text: String,
    runs: Vec<Run>,
}

impl Paragraph {
    /// A paragraph whose text is the concatenation of its runs.
    pub fn new(runs: Vec<Run>) -> Self {
        let text = runs.iter().map(Run::text).collect();
        Self { text, runs }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn runs(&self) -> &[Run] {
        &self.runs
    }

    /// Mutable access to run styling. The run list itself stays fixed.
    pub fn runs_mut(&mut self) -> impl Iterator<Item = &mut Run> {
        self.runs.iter_mut()
    }
}

/// The mutable aggregate of paragraphs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    paragraphs: Vec<Paragraph>,
}

impl Document {
    pub fn new(paragraphs: Vec<Paragraph>) -> Self {
        Self { paragraphs }
    }

    pub fn paragraphs(&self) -> &[Paragraph] {
        &self.paragraphs
    }

    pub fn paragraphs_mut(&mut self) -> impl Iterator<Item = &mut Paragraph> {
        self.paragraphs.iter_mut()
    }

    /// Append a paragraph at the end of the document.
    pub fn push(&mut self, paragraph: Paragraph) {
        self.paragraphs.push(paragraph);
    }

    pub fn len(&self) -> usize {
        self.paragraphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paragraphs.is_empty()
    }

    /// Trimmed texts of every paragraph that has any, in document order.
    pub fn text_paragraphs(&self) -> Vec<String> {
        self.paragraphs
            .iter()
            .map(|p| p.text().trim())
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect()
    }
}
