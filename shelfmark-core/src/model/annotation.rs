use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use super::EntryId;
use crate::error::ValidationError;

/// Annotation category
///
/// Citations and questions are the kinds the interface offers; any other
/// label found in an imported document is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AnnotationKind {
    Citation,
    Question,
    Other(String),
}

impl AnnotationKind {
    /// Kinds offered when creating an annotation, in picker order
    pub fn known() -> &'static [AnnotationKind] {
        &[AnnotationKind::Citation, AnnotationKind::Question]
    }

    pub fn as_str(&self) -> &str {
        match self {
            AnnotationKind::Citation => "citation",
            AnnotationKind::Question => "question",
            AnnotationKind::Other(label) => label,
        }
    }

    pub fn is_question(&self) -> bool {
        matches!(self, AnnotationKind::Question)
    }

    /// Next kind in picker order, wrapping around
    pub fn cycle(&self) -> AnnotationKind {
        let known = Self::known();
        match known.iter().position(|k| k == self) {
            Some(i) => known[(i + 1) % known.len()].clone(),
            None => known[0].clone(),
        }
    }
}

impl Default for AnnotationKind {
    fn default() -> Self {
        AnnotationKind::Citation
    }
}

impl fmt::Display for AnnotationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for AnnotationKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "citation" => AnnotationKind::Citation,
            "question" => AnnotationKind::Question,
            _ => AnnotationKind::Other(value),
        }
    }
}

impl From<&str> for AnnotationKind {
    fn from(value: &str) -> Self {
        AnnotationKind::from(value.to_string())
    }
}

impl From<AnnotationKind> for String {
    fn from(kind: AnnotationKind) -> Self {
        match kind {
            AnnotationKind::Other(label) => label,
            known => known.as_str().to_string(),
        }
    }
}

/// A page-anchored note attached to a book
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    pub id: EntryId,
    #[serde(default, deserialize_with = "page_or_zero")]
    pub page: u32,
    #[serde(rename = "type", default)]
    pub kind: AnnotationKind,
    pub text: String,
}

impl Annotation {
    pub fn new(draft: ValidAnnotation) -> Self {
        Self {
            id: EntryId::new(),
            page: draft.page,
            kind: draft.kind,
            text: draft.text,
        }
    }

    /// Overwrite page, kind and text, keeping the identifier
    pub fn apply(&mut self, draft: ValidAnnotation) {
        self.page = draft.page;
        self.kind = draft.kind;
        self.text = draft.text;
    }

    /// Character count used for marker sizing, never below 1
    pub fn text_len(&self) -> usize {
        self.text.chars().count().max(1)
    }
}

/// Unvalidated annotation input, as typed into a form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotationDraft {
    pub page: u32,
    pub kind: AnnotationKind,
    pub text: String,
}

/// Annotation input that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidAnnotation {
    page: u32,
    kind: AnnotationKind,
    text: String,
}

impl AnnotationDraft {
    pub fn new(page: u32, kind: AnnotationKind, text: impl Into<String>) -> Self {
        Self {
            page,
            kind,
            text: text.into(),
        }
    }

    pub fn validate(self) -> Result<ValidAnnotation, ValidationError> {
        let text = self.text.trim();
        if text.is_empty() {
            return Err(ValidationError::EmptyText);
        }
        Ok(ValidAnnotation {
            page: self.page,
            kind: self.kind,
            text: text.to_string(),
        })
    }
}

fn page_or_zero<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let raw = Option::<f64>::deserialize(deserializer)?;
    Ok(super::clamp_page(raw).unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trips_unknown_labels() {
        let kind: AnnotationKind = serde_json::from_str("\"idea\"").unwrap();
        assert_eq!(kind, AnnotationKind::Other("idea".to_string()));
        assert_eq!(serde_json::to_string(&kind).unwrap(), "\"idea\"");
        assert_eq!(
            serde_json::to_string(&AnnotationKind::Question).unwrap(),
            "\"question\""
        );
    }

    #[test]
    fn test_missing_or_null_page_reads_as_zero() {
        let ann: Annotation =
            serde_json::from_str(r#"{"id":"1","type":"citation","text":"hi"}"#).unwrap();
        assert_eq!(ann.page, 0);

        let ann: Annotation =
            serde_json::from_str(r#"{"id":"1","page":null,"type":"citation","text":"hi"}"#)
                .unwrap();
        assert_eq!(ann.page, 0);
    }

    #[test]
    fn test_draft_trims_and_rejects_blank_text() {
        let valid = AnnotationDraft::new(3, AnnotationKind::Question, "  why?  ")
            .validate()
            .unwrap();
        let ann = Annotation::new(valid);
        assert_eq!(ann.text, "why?");

        let err = AnnotationDraft::new(3, AnnotationKind::Citation, "   ")
            .validate()
            .unwrap_err();
        assert_eq!(err, ValidationError::EmptyText);
    }

    #[test]
    fn test_cycle_visits_known_kinds() {
        assert_eq!(AnnotationKind::Citation.cycle(), AnnotationKind::Question);
        assert_eq!(AnnotationKind::Question.cycle(), AnnotationKind::Citation);
        assert_eq!(
            AnnotationKind::Other("idea".into()).cycle(),
            AnnotationKind::Citation
        );
    }
}
