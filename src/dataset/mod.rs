//! Harvested data model
//!
//! Records are extracted per listing entry, grouped into one `PageResult`
//! per page number, and the page results of a run form the `Dataset`.

use std::fmt;

/// Placeholder for a field with no matching element
pub const NOT_AVAILABLE: &str = "N/A";

/// One listing entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub title: String,

    /// Comma-joined author names
    pub authors: String,

    pub rating: String,

    /// "Want to read" counter text
    pub demand: String,
}

impl Record {
    /// Builds a record, substituting `N/A` for absent fields
    pub fn from_fields(
        title: Option<String>,
        authors: Vec<String>,
        rating: Option<String>,
        demand: Option<String>,
    ) -> Self {
        let authors = if authors.is_empty() {
            NOT_AVAILABLE.to_string()
        } else {
            authors.join(", ")
        };

        Self {
            title: or_not_available(title),
            authors,
            rating: or_not_available(rating),
            demand: or_not_available(demand),
        }
    }

    /// Row in sink column order: Title, Author, Rating, Want to Read
    pub fn to_row(&self) -> [&str; 4] {
        [
            self.title.as_str(),
            self.authors.as_str(),
            self.rating.as_str(),
            self.demand.as_str(),
        ]
    }
}

fn or_not_available(value: Option<String>) -> String {
    value.unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// How a page's attempt loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageOutcome {
    /// An attempt completed; records may still be empty
    Succeeded,

    /// No attempt completed; records are empty
    Exhausted,
}

impl fmt::Display for PageOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Succeeded => write!(f, "succeeded"),
            Self::Exhausted => write!(f, "exhausted"),
        }
    }
}

/// Records extracted from one page number
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageResult {
    pub page_number: u32,
    pub records: Vec<Record>,
    pub outcome: PageOutcome,

    /// Attempts spent, zero when no page handle could be acquired
    pub attempts: u32,
}

impl PageResult {
    pub fn succeeded(page_number: u32, records: Vec<Record>, attempts: u32) -> Self {
        Self {
            page_number,
            records,
            outcome: PageOutcome::Succeeded,
            attempts,
        }
    }

    /// Empty result for a page that yielded nothing
    pub fn exhausted(page_number: u32, attempts: u32) -> Self {
        Self {
            page_number,
            records: Vec::new(),
            outcome: PageOutcome::Exhausted,
            attempts,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// All page results of a run, in batch order then page order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    pages: Vec<PageResult>,
}

impl Dataset {
    pub fn new(pages: Vec<PageResult>) -> Self {
        Self { pages }
    }

    pub fn pages(&self) -> &[PageResult] {
        &self.pages
    }

    /// Every record, grouped by page
    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.pages.iter().flat_map(|page| page.records.iter())
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn record_count(&self) -> usize {
        self.pages.iter().map(|page| page.records.len()).sum()
    }

    pub fn page_numbers(&self) -> Vec<u32> {
        self.pages.iter().map(|page| page.page_number).collect()
    }
}
