use serde::{Deserialize, Serialize};

/// A résumé document extracted from markup or plain text.
///
/// Built fresh for every render request and never mutated afterwards.
/// `sections` keeps source order; empty sections are retained.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub name: Option<String>,
    pub contact: Option<String>,
    pub sections: Vec<Section>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub title: String,
    pub items: Vec<Item>,
}

/// One entry inside a section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Item {
    /// Two-column heading: title/date on the first row, subtitle/location on the second.
    Subheading {
        title: String,
        right_date: String,
        subtitle: String,
        subtitle_right: String,
    },
    /// Single-row two-column heading.
    ProjectHeading { title: String, right_date: String },
    Bullet { text: String },
    /// Unstructured text kept verbatim.
    PlainLine { text: String },
}

impl Section {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            items: Vec::new(),
        }
    }
}

impl Item {
    pub fn plain(text: impl Into<String>) -> Self {
        Item::PlainLine { text: text.into() }
    }

    pub fn bullet(text: impl Into<String>) -> Self {
        Item::Bullet { text: text.into() }
    }

    /// The non-empty text fields carried by this item, in reading order.
    pub fn leaf_texts(&self) -> Vec<&str> {
        let fields: Vec<&str> = match self {
            Item::Subheading {
                title,
                right_date,
                subtitle,
                subtitle_right,
            } => vec![title, right_date, subtitle, subtitle_right],
            Item::ProjectHeading { title, right_date } => vec![title, right_date],
            Item::Bullet { text } | Item::PlainLine { text } => vec![text],
        };
        fields.into_iter().filter(|s| !s.trim().is_empty()).collect()
    }
}

impl Document {
    /// Number of items across all sections.
    pub fn item_count(&self) -> usize {
        self.sections.iter().map(|s| s.items.len()).sum()
    }
}
