use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::{Annotation, EntryId};
use crate::error::ValidationError;

/// A book with its annotations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: EntryId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default, deserialize_with = "pages_or_unset")]
    pub pages: Option<u32>,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Book {
    pub fn new(draft: ValidBook) -> Self {
        let now = Utc::now();
        Self {
            id: EntryId::new(),
            title: draft.title,
            author: draft.author,
            pages: draft.pages,
            annotations: Vec::new(),
            created_at: Some(now),
            updated_at: Some(now),
        }
    }

    /// Overwrite title, author and page count, keeping annotations
    pub fn apply(&mut self, draft: ValidBook) {
        self.title = draft.title;
        self.author = draft.author;
        self.pages = draft.pages;
        self.touch();
    }

    pub fn annotation(&self, id: &EntryId) -> Option<&Annotation> {
        self.annotations.iter().find(|a| &a.id == id)
    }

    pub fn annotation_mut(&mut self, id: &EntryId) -> Option<&mut Annotation> {
        self.annotations.iter_mut().find(|a| &a.id == id)
    }

    pub fn add_annotation(&mut self, annotation: Annotation) {
        self.annotations.push(annotation);
        self.touch();
    }

    pub fn remove_annotation(&mut self, id: &EntryId) -> Option<Annotation> {
        let pos = self.annotations.iter().position(|a| &a.id == id)?;
        self.touch();
        Some(self.annotations.remove(pos))
    }

    /// Annotations ordered by page; equal pages keep insertion order
    pub fn annotations_by_page(&self) -> Vec<&Annotation> {
        let mut sorted: Vec<_> = self.annotations.iter().collect();
        sorted.sort_by_key(|a| a.page);
        sorted
    }

    /// Highest page referenced by any annotation, 0 when there are none
    pub fn max_annotation_page(&self) -> u32 {
        self.annotations.iter().map(|a| a.page).max().unwrap_or(0)
    }

    pub fn touch(&mut self) {
        self.updated_at = Some(Utc::now());
    }

    pub(crate) fn check_annotation_ids(&self) -> Result<(), ValidationError> {
        let mut seen = std::collections::HashSet::new();
        for ann in &self.annotations {
            if !seen.insert(&ann.id) {
                return Err(ValidationError::DuplicateAnnotationId {
                    book: self.id.clone(),
                    annotation: ann.id.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Unvalidated book input, as typed into a form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookDraft {
    pub title: String,
    pub author: String,
    pub pages: Option<u32>,
}

/// Book input that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidBook {
    title: String,
    author: String,
    pages: Option<u32>,
}

impl BookDraft {
    pub fn new(title: impl Into<String>, author: impl Into<String>, pages: Option<u32>) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            pages,
        }
    }

    pub fn validate(self) -> Result<ValidBook, ValidationError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        let author = self.author.trim();
        if author.is_empty() {
            return Err(ValidationError::EmptyAuthor);
        }
        Ok(ValidBook {
            title: title.to_string(),
            author: author.to_string(),
            // a zero page count means "unknown"
            pages: self.pages.filter(|&p| p > 0),
        })
    }
}

fn pages_or_unset<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
    let raw = Option::<f64>::deserialize(deserializer)?;
    Ok(super::clamp_page(raw))
}
