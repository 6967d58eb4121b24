//! In-memory list filtering for back-office views.
//!
//! A [`ListFilter`] combines a status-equality predicate with a
//! case-insensitive substring search. Both must hold for a record to be kept.
//! Filtering runs over an already-loaded collection and never reorders it.

use std::str::FromStr;

/// Status predicate with an `all` wildcard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter<S> {
    #[default]
    All,
    Only(S),
}

impl<S: PartialEq + Copy> StatusFilter<S> {
    pub fn matches(&self, status: S) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => *wanted == status,
        }
    }
}

impl<S: FromStr> FromStr for StatusFilter<S> {
    type Err = S::Err;

    /// `"all"` (or blank) selects everything; anything else must parse as `S`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        trimmed.parse().map(Self::Only)
    }
}

/// Lowercased search needle. An empty needle matches every record.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchText(String);

impl SearchText {
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_lowercase())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when any haystack contains the needle, ignoring case.
    pub fn matches<'a>(&self, haystacks: impl IntoIterator<Item = &'a str>) -> bool {
        self.is_empty()
            || haystacks
                .into_iter()
                .any(|field| field.to_lowercase().contains(&self.0))
    }
}

/// A record that can appear in a filtered list.
pub trait Listable {
    type Status: PartialEq + Copy;

    fn list_status(&self) -> Self::Status;

    /// Text fields searched by [`SearchText`].
    fn search_fields(&self) -> Vec<&str>;
}

/// Conjunction of a status predicate and a text search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListFilter<S> {
    pub status: StatusFilter<S>,
    pub search: SearchText,
}

impl<S> Default for ListFilter<S> {
    fn default() -> Self {
        Self {
            status: StatusFilter::All,
            search: SearchText::default(),
        }
    }
}

impl<S: PartialEq + Copy> ListFilter<S> {
    pub fn new(status: StatusFilter<S>, search: SearchText) -> Self {
        Self { status, search }
    }

    pub fn matches<R>(&self, record: &R) -> bool
    where
        R: Listable<Status = S>,
    {
        self.status.matches(record.list_status()) && self.search.matches(record.search_fields())
    }

    /// Keep the records satisfying both predicates, in their original order.
    pub fn apply<R>(&self, records: Vec<R>) -> Vec<R>
    where
        R: Listable<Status = S>,
    {
        records.into_iter().filter(|record| self.matches(record)).collect()
    }
}

/// Filtered page handed to list views.
#[derive(Debug, Clone, PartialEq)]
pub struct Listing<R> {
    pub items: Vec<R>,
}

impl<R> Listing<R> {
    pub fn total(&self) -> usize {
        self.items.len()
    }

    /// Signals the "no records" state to clients.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<R> From<Vec<R>> for Listing<R> {
    fn from(items: Vec<R>) -> Self {
        Self { items }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Colour {
        Red,
        Blue,
    }

    impl FromStr for Colour {
        type Err = ();

        fn from_str(s: &str) -> Result<Self, Self::Err> {
            match s {
                "red" => Ok(Self::Red),
                "blue" => Ok(Self::Blue),
                _ => Err(()),
            }
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Row(&'static str, Colour);

    impl Listable for Row {
        type Status = Colour;

        fn list_status(&self) -> Colour {
            self.1
        }

        fn search_fields(&self) -> Vec<&str> {
            vec![self.0]
        }
    }

    #[fixture]
    fn rows() -> Vec<Row> {
        vec![
            Row("John Doe", Colour::Red),
            Row("Joanna Smith", Colour::Blue),
            Row("Mark Jones", Colour::Red),
        ]
    }

    #[rstest]
    fn all_with_empty_search_keeps_everything(rows: Vec<Row>) {
        let filter = ListFilter::<Colour>::default();
        assert_eq!(filter.apply(rows.clone()), rows);
    }

    #[rstest]
    fn filters_are_conjunctive(rows: Vec<Row>) {
        let filter = ListFilter::new(StatusFilter::Only(Colour::Red), SearchText::new("JO"));
        let kept = filter.apply(rows);
        assert_eq!(
            kept,
            vec![Row("John Doe", Colour::Red), Row("Mark Jones", Colour::Red)]
        );
    }

    #[rstest]
    fn status_filter_is_idempotent(rows: Vec<Row>) {
        let filter = ListFilter::new(StatusFilter::Only(Colour::Blue), SearchText::default());
        let once = filter.apply(rows);
        let twice = filter.apply(once.clone());
        assert_eq!(once, twice);
    }

    #[rstest]
    #[case("all", StatusFilter::All)]
    #[case("", StatusFilter::All)]
    #[case(" ALL ", StatusFilter::All)]
    #[case("blue", StatusFilter::Only(Colour::Blue))]
    fn parses_status_filter(#[case] raw: &str, #[case] expected: StatusFilter<Colour>) {
        assert_eq!(raw.parse::<StatusFilter<Colour>>(), Ok(expected));
    }

    #[rstest]
    fn no_match_yields_empty_listing(rows: Vec<Row>) {
        let filter = ListFilter::new(StatusFilter::All, SearchText::new("zzz"));
        let listing = Listing::from(filter.apply(rows));
        assert!(listing.is_empty());
        assert_eq!(listing.total(), 0);
    }
}
