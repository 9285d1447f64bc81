//! Pagination plan for a harvest run.
//!
//! Pages are numbered from 1 and visited in order. In suffix mode the page
//! number is appended verbatim to the base URL (`http://x/p=` → `http://x/p=2`);
//! in single-page mode every iteration reuses the base URL unchanged.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaginationMode {
    /// Append the page number to the base URL
    #[default]
    UrlSuffix,
    /// Reuse the base URL for every iteration
    SinglePage,
}

impl PaginationMode {
    pub const fn from_single_page_flag(single_page: bool) -> Self {
        if single_page {
            Self::SinglePage
        } else {
            Self::UrlSuffix
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageTarget {
    pub number: u32,
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct PagePlan {
    base_url: String,
    page_count: u32,
    mode: PaginationMode,
}

impl PagePlan {
    pub fn new(base_url: impl Into<String>, page_count: u32, mode: PaginationMode) -> Self {
        Self {
            base_url: base_url.into(),
            page_count,
            mode,
        }
    }

    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    /// URL for one page number
    pub fn url_for(&self, page: u32) -> String {
        match self.mode {
            PaginationMode::SinglePage => self.base_url.clone(),
            PaginationMode::UrlSuffix => format!("{}{}", self.base_url, page),
        }
    }

    /// Targets in visiting order, `1..=page_count`
    pub fn targets(&self) -> impl Iterator<Item = PageTarget> + '_ {
        (1..=self.page_count).map(|number| PageTarget {
            number,
            url: self.url_for(number),
        })
    }
}
