//! Core domain types: the coding taxonomy and classifier matches.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

/// One of the eight fixed qualitative-research coding categories.
///
/// The set is closed: codes outside `A`..=`H` never become a `Category`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
}

impl Category {
    /// Every category, in taxonomy (legend) order.
    pub const ALL: [Category; 8] = [
        Self::A,
        Self::B,
        Self::C,
        Self::D,
        Self::E,
        Self::F,
        Self::G,
        Self::H,
    ];

    /// Parse a model-supplied code. Whitespace and case are ignored;
    /// anything outside the taxonomy yields `None`.
    pub fn parse(code: &str) -> Option<Self> {
        match code.trim().to_uppercase().as_str() {
            "A" => Some(Self::A),
            "B" => Some(Self::B),
            "C" => Some(Self::C),
            "D" => Some(Self::D),
            "E" => Some(Self::E),
            "F" => Some(Self::F),
            "G" => Some(Self::G),
            "H" => Some(Self::H),
            _ => None,
        }
    }

    /// Single-letter code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::E => "E",
            Self::F => "F",
            Self::G => "G",
            Self::H => "H",
        }
    }

    /// Display title shown in the legend.
    pub fn title(&self) -> &'static str {
        match self {
            Self::A => "Background & Context",
            Self::B => "Feasibility & Practical Implementation",
            Self::C => "Validity & Learning Assurance",
            Self::D => "Disciplinary Relevance",
            Self::E => "Student Engagement & Observations",
            Self::F => "Reflection & Improvement",
            Self::G => "Sustainability & Future Use",
            Self::H => "Additional Insights",
        }
    }

    /// What the category covers. Sent to the model as part of the taxonomy.
    pub fn description(&self) -> &'static str {
        match self {
            Self::A => {
                "Course structure and participant role including assessment format and delivery."
            }
            Self::B => {
                "Practical, logistical, and administrative aspects of implementing oral assessment."
            }
            Self::C => "Evidence that the oral assessment measured intended learning outcomes.",
            Self::D => "Fit between oral assessment and disciplinary norms, skills, and values.",
            Self::E => "Student reactions, fairness, and inclusivity observations.",
            Self::F => "What worked, what did not, and what to change next time.",
            Self::G => "Whether this approach can be maintained, scaled, or used long term.",
            Self::H => "Open reflections, emergent, or unanticipated themes.",
        }
    }

    /// Highlight fill as six uppercase hex digits (`RRGGBB`, no `#`).
    pub fn color(&self) -> &'static str {
        match self {
            Self::A => "FFF2CC", // pastel yellow
            Self::B => "DAEEF3", // pale aqua
            Self::C => "E2F0D9", // mint
            Self::D => "FCE4D6", // blush peach
            Self::E => "E4DFEC", // light lavender
            Self::F => "D9E1F2", // periwinkle
            Self::G => "F2F2F2", // soft gray
            Self::H => "D5E8D4", // pastel green
        }
    }

    /// Fill color as an `(r, g, b)` triple, for terminal swatches.
    pub fn rgb(&self) -> (u8, u8, u8) {
        let hex = self.color();
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).unwrap_or(0);
        (channel(0), channel(2), channel(4))
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}. {}", self.code(), self.title())
    }
}

// ---------------------------------------------------------------------------
// QuoteMatch
// ---------------------------------------------------------------------------

/// A verbatim excerpt the classifier assigned to a category.
///
/// The quote is only *claimed* to exist in the source text; the
/// highlighter decides whether it actually does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteMatch {
    pub category: Category,
    pub quote: String,
}

impl QuoteMatch {
    pub fn new(category: Category, quote: impl Into<String>) -> Self {
        Self {
            category,
            quote: quote.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_normalizes_case_and_whitespace() {
        assert_eq!(Category::parse("a"), Some(Category::A));
        assert_eq!(Category::parse("  h "), Some(Category::H));
        assert_eq!(Category::parse("C"), Some(Category::C));
    }

    #[test]
    fn parse_rejects_codes_outside_taxonomy() {
        assert_eq!(Category::parse("Z"), None);
        assert_eq!(Category::parse(""), None);
        assert_eq!(Category::parse("AB"), None);
    }

    #[test]
    fn taxonomy_is_closed_and_ordered() {
        let codes: Vec<&str> = Category::ALL.iter().map(|c| c.code()).collect();
        assert_eq!(codes, ["A", "B", "C", "D", "E", "F", "G", "H"]);
        for category in Category::ALL {
            assert_eq!(Category::parse(category.code()), Some(category));
        }
    }

    #[test]
    fn colors_are_six_hex_digits() {
        for category in Category::ALL {
            let color = category.color();
            assert_eq!(color.len(), 6, "{category}");
            assert!(color.chars().all(|c| c.is_ascii_hexdigit()), "{category}");
        }
    }

    #[test]
    fn rgb_decodes_fill() {
        assert_eq!(Category::A.rgb(), (0xFF, 0xF2, 0xCC));
        assert_eq!(Category::G.rgb(), (0xF2, 0xF2, 0xF2));
    }

    #[test]
    fn display_shows_code_and_title() {
        assert_eq!(Category::B.to_string(), "B. Feasibility & Practical Implementation");
    }

    #[test]
    fn quote_match_serialization() {
        let m = QuoteMatch::new(Category::E, "students felt it was fair");
        let json = serde_json::to_string(&m).expect("serialize");
        assert_eq!(json, r#"{"category":"E","quote":"students felt it was fair"}"#);
        let parsed: QuoteMatch = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed, m);
    }
}
