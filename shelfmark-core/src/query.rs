//! Filtering, ordering and counting for the book list and annotation lists.
//!
//! Everything here is a pure function of its inputs; callers re-run the
//! queries after every change.

use std::fmt;
use std::str::FromStr;

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::model::{Annotation, AnnotationKind, Book};

/// Which annotations of a book are shown.
///
/// The kind filter and the question/non-question toggles are exclusive:
/// choosing one clears the other, so at most one narrows the list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AnnotationFilter {
    #[default]
    All,
    Kind(AnnotationKind),
    Questions,
    NonQuestions,
}

/// The two count toggles shown next to a book
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatFilter {
    All,
    Questions,
    NonQuestions,
}

impl AnnotationFilter {
    pub fn matches(&self, annotation: &Annotation) -> bool {
        match self {
            AnnotationFilter::All => true,
            AnnotationFilter::Kind(kind) => &annotation.kind == kind,
            AnnotationFilter::Questions => annotation.kind.is_question(),
            AnnotationFilter::NonQuestions => !annotation.kind.is_question(),
        }
    }

    /// Pick a kind (`None` for every kind); clears any stat toggle
    pub fn select_kind(&mut self, kind: Option<AnnotationKind>) {
        *self = kind.map_or(AnnotationFilter::All, AnnotationFilter::Kind);
    }

    /// Press a stat toggle; pressing the active one turns it off.
    /// Clears any kind selection either way.
    pub fn toggle_stat(&mut self, stat: StatFilter) {
        *self = match (self.stat(), stat) {
            (current, pressed) if current == pressed => AnnotationFilter::All,
            (_, StatFilter::Questions) => AnnotationFilter::Questions,
            (_, StatFilter::NonQuestions) => AnnotationFilter::NonQuestions,
            (_, StatFilter::All) => AnnotationFilter::All,
        };
    }

    /// The selected kind, or `None` when showing every kind
    pub fn kind(&self) -> Option<&AnnotationKind> {
        match self {
            AnnotationFilter::Kind(kind) => Some(kind),
            _ => None,
        }
    }

    pub fn stat(&self) -> StatFilter {
        match self {
            AnnotationFilter::Questions => StatFilter::Questions,
            AnnotationFilter::NonQuestions => StatFilter::NonQuestions,
            _ => StatFilter::All,
        }
    }
}

/// Question / non-question totals over a whole book
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnnotationStats {
    pub questions: usize,
    pub non_questions: usize,
}

impl AnnotationStats {
    pub fn of(annotations: &[Annotation]) -> Self {
        let questions = annotations.iter().filter(|a| a.kind.is_question()).count();
        Self {
            questions,
            non_questions: annotations.len() - questions,
        }
    }

    pub fn total(&self) -> usize {
        self.questions + self.non_questions
    }
}

/// Filtered, page-ordered annotations plus whole-book counts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationView<'a> {
    pub annotations: Vec<&'a Annotation>,
    pub stats: AnnotationStats,
}

/// Filter a book's annotations and order them by page.
///
/// The sort is stable, so annotations on the same page keep their
/// stored order. Counts ignore the filter.
pub fn query_annotations<'a>(
    annotations: &'a [Annotation],
    filter: &AnnotationFilter,
) -> AnnotationView<'a> {
    let mut shown: Vec<&Annotation> = annotations.iter().filter(|a| filter.matches(a)).collect();
    shown.sort_by_key(|a| a.page);
    AnnotationView {
        annotations: shown,
        stats: AnnotationStats::of(annotations),
    }
}

/// Kinds worth offering in a kind filter for this book: the known kinds
/// first, then any other label the book uses, in order of first use
pub fn available_kinds(annotations: &[Annotation]) -> Vec<AnnotationKind> {
    let mut kinds: Vec<AnnotationKind> = AnnotationKind::known().to_vec();
    for ann in annotations {
        if !kinds.contains(&ann.kind) {
            kinds.push(ann.kind.clone());
        }
    }
    kinds
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    #[default]
    Title,
    Author,
}

impl SortKey {
    pub fn toggle(self) -> Self {
        match self {
            SortKey::Title => SortKey::Author,
            SortKey::Author => SortKey::Title,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Title => "title",
            SortKey::Author => "author",
        }
    }

    fn field<'a>(&self, book: &'a Book) -> &'a str {
        match self {
            SortKey::Title => &book.title,
            SortKey::Author => &book.author,
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "title" => Ok(SortKey::Title),
            "author" => Ok(SortKey::Author),
            other => Err(format!("unknown sort key {other:?} (expected title or author)")),
        }
    }
}

/// Search text and ordering for the book list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookQuery {
    pub search: String,
    pub sort: SortKey,
}

/// Books whose title or author contains the search text (case-insensitive),
/// ordered by the sort key
pub fn search_books<'a>(books: &'a [Book], query: &BookQuery) -> Vec<&'a Book> {
    let needle = query.search.to_lowercase();
    let mut found: Vec<(CollationKey, &Book)> = books
        .iter()
        .filter(|b| {
            b.title.to_lowercase().contains(&needle) || b.author.to_lowercase().contains(&needle)
        })
        .map(|b| (collation_key(query.sort.field(b)), b))
        .collect();
    found.sort_by(|(a, _), (b, _)| a.cmp(b));
    found.into_iter().map(|(_, book)| book).collect()
}

/// Primary key ignores accents and case; the lowercased text breaks ties
type CollationKey = (String, String);

/// Sort key that orders "Étranger" next to "Etranger" rather than after "Z"
fn collation_key(text: &str) -> CollationKey {
    let folded = text
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect();
    (folded, text.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AnnotationDraft, BookDraft};

    fn note(page: u32, kind: AnnotationKind, text: &str) -> Annotation {
        Annotation::new(AnnotationDraft::new(page, kind, text).validate().unwrap())
    }

    fn sample() -> Vec<Annotation> {
        vec![
            note(30, AnnotationKind::Question, "q30"),
            note(10, AnnotationKind::Citation, "c10"),
            note(10, AnnotationKind::Question, "q10"),
            note(0, AnnotationKind::Other("idea".into()), "i0"),
        ]
    }

    fn texts(view: &AnnotationView<'_>) -> Vec<String> {
        view.annotations.iter().map(|a| a.text.clone()).collect()
    }

    #[test]
    fn test_all_sorted_by_page_stably() {
        let notes = sample();
        let view = query_annotations(&notes, &AnnotationFilter::All);
        assert_eq!(texts(&view), vec!["i0", "c10", "q10", "q30"]);
    }

    #[test]
    fn test_stats_ignore_filter() {
        let notes = sample();
        let view = query_annotations(&notes, &AnnotationFilter::Kind(AnnotationKind::Citation));
        assert_eq!(texts(&view), vec!["c10"]);
        assert_eq!(view.stats.questions, 2);
        assert_eq!(view.stats.non_questions, 2);
        assert_eq!(view.stats.total(), notes.len());
    }

    #[test]
    fn test_non_questions_include_other_kinds() {
        let notes = sample();
        let view = query_annotations(&notes, &AnnotationFilter::NonQuestions);
        assert_eq!(texts(&view), vec!["i0", "c10"]);
    }

    #[test]
    fn test_kind_then_stat_leaves_only_stat() {
        let mut filter = AnnotationFilter::default();
        filter.select_kind(Some(AnnotationKind::Citation));
        filter.toggle_stat(StatFilter::Questions);
        assert_eq!(filter, AnnotationFilter::Questions);
        assert_eq!(filter.kind(), None);
    }

    #[test]
    fn test_stat_then_kind_leaves_only_kind() {
        let mut filter = AnnotationFilter::default();
        filter.toggle_stat(StatFilter::NonQuestions);
        filter.select_kind(Some(AnnotationKind::Question));
        assert_eq!(filter.stat(), StatFilter::All);
        assert_eq!(filter.kind(), Some(&AnnotationKind::Question));
    }

    #[test]
    fn test_pressing_active_stat_turns_it_off() {
        let mut filter = AnnotationFilter::default();
        filter.toggle_stat(StatFilter::Questions);
        filter.toggle_stat(StatFilter::Questions);
        assert_eq!(filter, AnnotationFilter::All);

        filter.toggle_stat(StatFilter::Questions);
        filter.toggle_stat(StatFilter::NonQuestions);
        assert_eq!(filter, AnnotationFilter::NonQuestions);
    }

    #[test]
    fn test_available_kinds() {
        let kinds = available_kinds(&sample());
        assert_eq!(
            kinds,
            vec![
                AnnotationKind::Citation,
                AnnotationKind::Question,
                AnnotationKind::Other("idea".into())
            ]
        );
    }

    fn book(title: &str, author: &str) -> Book {
        Book::new(BookDraft::new(title, author, None).validate().unwrap())
    }

    #[test]
    fn test_search_matches_title_or_author() {
        let books = vec![
            book("Dune", "Herbert"),
            book("Emma", "Austen"),
            book("Persuasion", "Austen"),
        ];
        let query = BookQuery {
            search: "AUST".into(),
            sort: SortKey::Title,
        };
        let found: Vec<_> = search_books(&books, &query)
            .iter()
            .map(|b| b.title.as_str())
            .collect();
        assert_eq!(found, vec!["Emma", "Persuasion"]);

        let query = BookQuery {
            search: "dun".into(),
            sort: SortKey::Title,
        };
        assert_eq!(search_books(&books, &query).len(), 1);
    }

    #[test]
    fn test_sort_by_author_is_case_insensitive() {
        let books = vec![book("B", "zola"), book("A", "Balzac"), book("C", "austen")];
        let query = BookQuery {
            search: String::new(),
            sort: SortKey::Author,
        };
        let found: Vec<_> = search_books(&books, &query)
            .iter()
            .map(|b| b.author.as_str())
            .collect();
        assert_eq!(found, vec!["austen", "Balzac", "zola"]);
    }

    #[test]
    fn test_accented_titles_sort_with_their_base_letter() {
        let books = vec![
            book("Zadig", "Voltaire"),
            book("Étranger", "Camus"),
            book("Germinal", "Zola"),
        ];
        let query = BookQuery::default();
        let found: Vec<_> = search_books(&books, &query)
            .iter()
            .map(|b| b.title.as_str())
            .collect();
        assert_eq!(found, vec!["Étranger", "Germinal", "Zadig"]);

        assert!(collation_key("été") < collation_key("ETRE"));
        assert!(collation_key("cote") < collation_key("côte"));
    }

    #[test]
    fn test_sort_key_parsing() {
        assert_eq!("Author".parse::<SortKey>().unwrap(), SortKey::Author);
        assert!("year".parse::<SortKey>().is_err());
        assert_eq!(SortKey::Title.toggle(), SortKey::Author);
    }
}
