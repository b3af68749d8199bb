use crate::errors::WidgetError;
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Emotion {
    pub label: String,
    pub image_ref: String,
}

impl Emotion {
    pub fn new(label: impl Into<String>, image_ref: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            image_ref: image_ref.into(),
        }
    }

    /// Label with its first character upper-cased, as shown in the summary.
    pub fn display_label(&self) -> String {
        capitalize(&self.label)
    }
}

/// Fixed, ordered set of emotions shown on the board.
#[derive(Debug, Clone)]
pub struct Catalog {
    emotions: Vec<Emotion>,
}

impl Catalog {
    /// Labels end up in routes and markup attributes, so they are restricted
    /// to lowercase ASCII letters, digits, `_` and `-`.
    pub fn new(emotions: Vec<Emotion>) -> Result<Self, WidgetError> {
        let mut seen = HashSet::with_capacity(emotions.len());
        for emotion in &emotions {
            if !is_valid_label(&emotion.label) {
                return Err(WidgetError::InvalidCatalog(format!(
                    "label {:?} must be non-empty lowercase ascii, digits, '_' or '-'",
                    emotion.label
                )));
            }
            if !seen.insert(emotion.label.as_str()) {
                return Err(WidgetError::InvalidCatalog(format!(
                    "duplicate label {:?}",
                    emotion.label
                )));
            }
        }
        Ok(Self { emotions })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Emotion> {
        self.emotions.iter()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.emotions.iter().map(|emotion| emotion.label.as_str())
    }

    pub fn get(&self, label: &str) -> Option<&Emotion> {
        self.emotions.iter().find(|emotion| emotion.label == label)
    }

    pub fn contains(&self, label: &str) -> bool {
        self.get(label).is_some()
    }

    pub fn len(&self) -> usize {
        self.emotions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.emotions.is_empty()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        let emotions = [
            ("sad", "images/sad.jpeg"),
            ("loved", "images/loved.jpeg"),
            ("angry", "images/angry.png"),
            ("relaxed", "images/relaxed.png"),
            ("sleepy", "images/sleepy.png"),
            ("sick", "images/sick.png"),
            ("happy", "images/happy.png"),
            ("excited", "images/excited.png"),
        ]
        .into_iter()
        .map(|(label, image_ref)| Emotion::new(label, image_ref))
        .collect();

        Self { emotions }
    }
}

pub fn capitalize(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn is_valid_label(label: &str) -> bool {
    !label.is_empty()
        && label
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_' || b == b'-')
}
