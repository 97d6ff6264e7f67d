use serde::{Deserialize, Serialize};

use crate::{
    constants::{MAX_PAGE_SIZE, RECIPE_COUNT_PER_PAGE},
    error::Error,
};

/// Window requested by the caller. `offset` counts rows, not pages.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub offset: i64,
    pub limit: i64,
}

impl Page {
    pub fn new(offset: i64, limit: i64) -> Self {
        Self {
            offset: offset.max(0),
            limit: limit.clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// Builds a window from a 1-based page number.
    ///
    /// Fails when the page starts beyond the largest representable offset.
    pub fn numbered(page: i64, limit: i64) -> Result<Self, Error> {
        let limit = limit.clamp(1, MAX_PAGE_SIZE);
        let offset = (page.max(1) - 1)
            .checked_mul(limit)
            .ok_or_else(|| Error::validation(format!("Page {page} is out of range")))?;

        Ok(Self::new(offset, limit))
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(0, RECIPE_COUNT_PER_PAGE)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PageContext<T> {
    pub rows: Vec<T>,
    pub total_rows: i64,
    pub next_offset: Option<i64>,
    pub prev_offset: Option<i64>,
}

impl<T> PageContext<T> {
    pub fn from_rows(rows: Vec<T>, total_rows: i64, page: Page) -> Self {
        if rows.is_empty() && page.offset == 0 {
            return Self::no_rows();
        }

        let end = page.offset.saturating_add(rows.len() as i64);
        let next_offset = (end < total_rows).then_some(end);
        let prev_offset = (page.offset > 0).then(|| (page.offset - page.limit).max(0));

        Self {
            rows,
            total_rows,
            next_offset,
            prev_offset,
        }
    }

    /// Slices an already materialized, already ordered list
    pub fn paginate(rows: Vec<T>, page: Page) -> Self {
        let total_rows = rows.len() as i64;
        let rows = rows
            .into_iter()
            .skip(usize::try_from(page.offset).unwrap_or(0))
            .take(usize::try_from(page.limit).unwrap_or(usize::MAX))
            .collect();

        Self::from_rows(rows, total_rows, page)
    }

    pub fn no_rows() -> Self {
        Self {
            rows: vec![],
            total_rows: 0,
            next_offset: None,
            prev_offset: None,
        }
    }

    /// Same window, different rows. Used when each row is expanded into a richer view.
    pub fn with_rows<U>(self, rows: Vec<U>) -> PageContext<U> {
        PageContext {
            rows,
            total_rows: self.total_rows,
            next_offset: self.next_offset,
            prev_offset: self.prev_offset,
        }
    }
}
