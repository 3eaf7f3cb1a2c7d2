use crate::utils::error::Result;
use crate::utils::validation::validate_positive_number;

pub const DEFAULT_PER_PAGE: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    per_page: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    /// 1-based page number after clamping.
    pub number: usize,
    pub num_pages: usize,
    pub per_page: usize,
    pub total: usize,
    /// Index range of the page within the full row list.
    pub start: usize,
    pub end: usize,
}

impl Page {
    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn has_next(&self) -> bool {
        self.number < self.num_pages
    }
}

impl Paginator {
    pub fn new(per_page: usize) -> Result<Self> {
        validate_positive_number("per_page", per_page, 1)?;
        Ok(Self { per_page })
    }

    pub fn per_page(&self) -> usize {
        self.per_page
    }

    /// Page `number` of `total` rows. Out-of-range numbers clamp to the
    /// first/last page; an empty list still has one (empty) page.
    pub fn page(&self, total: usize, number: usize) -> Page {
        let num_pages = total.div_ceil(self.per_page).max(1);
        let number = number.clamp(1, num_pages);
        let start = ((number - 1) * self.per_page).min(total);
        let end = (start + self.per_page).min(total);

        Page {
            number,
            num_pages,
            per_page: self.per_page,
            total,
            start,
            end,
        }
    }
}

impl Default for Paginator {
    fn default() -> Self {
        Self {
            per_page: DEFAULT_PER_PAGE,
        }
    }
}
