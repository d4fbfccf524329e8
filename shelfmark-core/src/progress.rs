//! Reading-progress track: where each annotation sits along a book and how
//! wide its marker is.

use crate::model::{Annotation, AnnotationKind, Book, EntryId};

/// Narrowest marker, in percent of the track width
pub const MIN_MARKER_WIDTH: f64 = 1.6;
/// Widest marker, in percent of the track width
pub const MAX_MARKER_WIDTH: f64 = 18.0;
const BASE_MARKER_WIDTH: f64 = 2.0;
const MARKER_WIDTH_SPAN: f64 = 12.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub annotation_id: EntryId,
    pub kind: AnnotationKind,
    pub page: u32,
    /// Fraction of the track width, in `[0, 1]`
    pub position: f64,
    /// Percent of the track width, in `[1.6, 18]`
    pub width: f64,
}

impl Marker {
    /// Tooltip text, e.g. `question • p.12`
    pub fn label(&self) -> String {
        format!("{} • p.{}", self.kind, self.page)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProgressTrack {
    /// Page count the track is scaled to; shown as the end label
    pub total_pages: u32,
    /// One marker per annotation, in stored order
    pub markers: Vec<Marker>,
}

/// Pages the track spans: the book's page count, stretched to cover the
/// furthest annotated page, and never below 1
pub fn effective_total(pages: Option<u32>, annotations: &[Annotation]) -> u32 {
    let furthest = annotations.iter().map(|a| a.page).max().unwrap_or(0);
    pages.unwrap_or(0).max(furthest).max(1)
}

/// Marker width in percent for a text of `len` characters when the longest
/// text in the book has `max_len` characters. Zero lengths count as 1.
pub fn marker_width(len: usize, max_len: usize) -> f64 {
    let len = len.max(1) as f64;
    let max_len = max_len.max(1) as f64;
    let width = BASE_MARKER_WIDTH + MARKER_WIDTH_SPAN * (len / max_len);
    width.clamp(MIN_MARKER_WIDTH, MAX_MARKER_WIDTH)
}

pub fn project(pages: Option<u32>, annotations: &[Annotation]) -> ProgressTrack {
    let total = effective_total(pages, annotations);
    let max_len = annotations.iter().map(Annotation::text_len).max().unwrap_or(1);

    let markers = annotations
        .iter()
        .map(|ann| Marker {
            annotation_id: ann.id.clone(),
            kind: ann.kind.clone(),
            page: ann.page,
            position: f64::from(ann.page.min(total)) / f64::from(total),
            width: marker_width(ann.text_len(), max_len),
        })
        .collect();

    ProgressTrack {
        total_pages: total,
        markers,
    }
}

/// Track for every annotation of a book (the list filter does not apply)
pub fn project_book(book: &Book) -> ProgressTrack {
    project(book.pages, &book.annotations)
}

impl ProgressTrack {
    /// Rasterize the track into `columns` character cells for text UIs.
    ///
    /// Each cell holds the kind of the marker covering it; markers later in
    /// stored order paint over earlier ones.
    pub fn cells(&self, columns: usize) -> Vec<Option<&AnnotationKind>> {
        let mut cells = vec![None; columns];
        if columns == 0 {
            return cells;
        }
        let last = columns - 1;
        for marker in &self.markers {
            let start = ((marker.position * last as f64).round() as usize).min(last);
            let span = ((marker.width / 100.0 * columns as f64).round() as usize).max(1);
            let end = (start + span).min(columns);
            for cell in &mut cells[start..end] {
                *cell = Some(&marker.kind);
            }
        }
        cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AnnotationDraft;

    fn note(page: u32, text: &str) -> Annotation {
        Annotation::new(
            AnnotationDraft::new(page, AnnotationKind::Citation, text)
                .validate()
                .unwrap(),
        )
    }

    #[test]
    fn test_track_stretches_to_furthest_page() {
        let notes = vec![note(0, "a"), note(50, "b"), note(150, "c")];
        let track = project(Some(100), &notes);
        assert_eq!(track.total_pages, 150);

        let positions: Vec<f64> = track.markers.iter().map(|m| m.position).collect();
        assert_eq!(positions[0], 0.0);
        assert!((positions[1] - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(positions[2], 1.0);
    }

    #[test]
    fn test_unset_pages_without_annotations() {
        let track = project(None, &[]);
        assert_eq!(track.total_pages, 1);
        assert!(track.markers.is_empty());
    }

    #[test]
    fn test_only_page_zero_annotations() {
        let track = project(None, &[note(0, "x")]);
        assert_eq!(track.total_pages, 1);
        assert_eq!(track.markers[0].position, 0.0);
    }

    #[test]
    fn test_marker_width_bounds() {
        assert_eq!(marker_width(10, 10), 14.0);
        assert_eq!(marker_width(0, 0), 14.0);
        assert!((marker_width(1, 1000) - 2.012).abs() < 1e-9);
        // a longer text than the reference still caps at the maximum
        assert_eq!(marker_width(50, 10), MAX_MARKER_WIDTH);
    }

    #[test]
    fn test_widths_relative_to_longest_text() {
        let notes = vec![note(1, "abcd"), note(2, "abcdefgh")];
        let track = project(Some(10), &notes);
        assert_eq!(track.markers[0].width, 8.0);
        assert_eq!(track.markers[1].width, 14.0);
        assert_eq!(track.markers[1].label(), "citation • p.2");
    }

    #[test]
    fn test_cells() {
        let notes = vec![note(0, "a"), note(10, "a")];
        let track = project(Some(10), &notes);
        let cells = track.cells(20);
        assert!(cells[0].is_some());
        assert!(cells[10].is_none());
        assert!(cells[19].is_some());
        assert!(track.cells(0).is_empty());
    }
}
