//! Reader view state
//!
//! Holds one load session's outcome plus the reader's search, category and
//! page selection. Content and error are mutually exclusive: the state is
//! exactly one of loading, failed or ready.

use crate::error::LoadError;
use crate::loader::Digest;
use crate::pagination::{calculate_pagination, Pagination, DEFAULT_PAGE_SIZE};
use crate::transform::NewsStory;
use euro5_common::i18n::{translate, Locale};
use std::fmt;

/// Outcome of the load session
#[derive(Debug, Default)]
pub enum LoadState {
    #[default]
    Loading,
    Failed(LoadError),
    Ready(Digest),
}

/// Category selection
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Named(String),
}

impl CategoryFilter {
    /// Parse a user choice; empty or "all" (any case) selects everything
    pub fn parse(choice: &str) -> Self {
        let choice = choice.trim();
        if choice.is_empty() || choice.eq_ignore_ascii_case("all") {
            CategoryFilter::All
        } else {
            CategoryFilter::Named(choice.to_string())
        }
    }

    pub fn matches(&self, story: &NewsStory) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Named(name) => story.category == *name,
        }
    }

    /// Display label; `All` is localized
    pub fn label(&self, locale: Locale) -> String {
        match self {
            CategoryFilter::All => translate(locale, "filters.allCategory", &[]),
            CategoryFilter::Named(name) => name.clone(),
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryFilter::All => f.write_str("All"),
            CategoryFilter::Named(name) => f.write_str(name),
        }
    }
}

/// Filterable, paginated view over a loaded digest
#[derive(Debug)]
pub struct DigestView {
    state: LoadState,
    search: String,
    category: CategoryFilter,
    page: usize,
    page_size: usize,
}

impl Default for DigestView {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl DigestView {
    pub fn new(page_size: usize) -> Self {
        Self {
            state: LoadState::Loading,
            search: String::new(),
            category: CategoryFilter::All,
            page: 1,
            page_size: page_size.max(1),
        }
    }

    /// Replace the state with a finished load
    pub fn apply(&mut self, result: Result<Digest, LoadError>) {
        self.state = match result {
            Ok(digest) => LoadState::Ready(digest),
            Err(e) => LoadState::Failed(e),
        };
        self.page = 1;
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, LoadState::Loading)
    }

    pub fn digest(&self) -> Option<&Digest> {
        match &self.state {
            LoadState::Ready(digest) => Some(digest),
            _ => None,
        }
    }

    /// Error text for the failed state, localized generic text when the
    /// cause carries no message
    pub fn error_message(&self, locale: Locale) -> Option<String> {
        match &self.state {
            LoadState::Failed(e) => Some(
                e.user_message()
                    .unwrap_or_else(|| translate(locale, "errors.unknownCsv", &[])),
            ),
            _ => None,
        }
    }

    fn stories(&self) -> &[NewsStory] {
        self.digest().map_or(&[], |d| d.stories.as_slice())
    }

    /// "All" followed by distinct story categories in first-seen order
    pub fn categories(&self) -> Vec<CategoryFilter> {
        let mut categories = vec![CategoryFilter::All];
        for story in self.stories() {
            if story.category.is_empty() {
                continue;
            }
            let choice = CategoryFilter::Named(story.category.clone());
            if !categories.contains(&choice) {
                categories.push(choice);
            }
        }
        categories
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn category(&self) -> &CategoryFilter {
        &self.category
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
        self.page = 1;
    }

    pub fn select_category(&mut self, category: CategoryFilter) {
        self.category = category;
        self.page = 1;
    }

    /// Stories matching the search and category, in digest order
    pub fn filtered_stories(&self) -> Vec<&NewsStory> {
        let needle = self.search.trim().to_lowercase();
        self.stories()
            .iter()
            .filter(|story| self.category.matches(story))
            .filter(|story| {
                needle.is_empty()
                    || story.title.to_lowercase().contains(&needle)
                    || story.excerpt.to_lowercase().contains(&needle)
            })
            .collect()
    }

    pub fn pagination(&self) -> Pagination {
        calculate_pagination(self.filtered_stories().len(), self.page, self.page_size)
    }

    /// Stories on the current page
    pub fn page_stories(&self) -> Vec<&NewsStory> {
        let pagination = self.pagination();
        self.filtered_stories()
            .into_iter()
            .skip(pagination.offset)
            .take(self.page_size)
            .collect()
    }

    pub fn prev_page(&mut self) {
        self.page = self.pagination().page.saturating_sub(1).max(1);
    }

    pub fn next_page(&mut self) {
        let pagination = self.pagination();
        self.page = (pagination.page + 1).min(pagination.total_pages.max(1));
    }

    pub fn jump_to(&mut self, page: usize) {
        self.page = calculate_pagination(self.filtered_stories().len(), page, self.page_size).page;
    }
}
