//! Page-numbered listings over stores that only resume after a cursor.
//!
//! A page > 1 is read by resuming after the last record of the previous page.
//! Those resume cursors are remembered per (filter, page size, page) so that
//! moving through a listing costs one bounded read per page. A page whose
//! cursor is unknown is located with a single positioned read instead of
//! re-reading every earlier page.
//!
//! Listings are also written by other processes, so each cursor is stored with
//! the record count it was taken under. A cursor is only reused while the
//! count still matches.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Mutex, MutexGuard};

use super::errors::DomainError;

/// An ordered, optionally filtered collection that can be read in pages.
pub trait PageSource {
    type Item;
    type Filter: Clone + Eq + Hash;
    type Cursor: Clone;

    /// Number of records matching `filter`.
    fn count(&self, filter: &Self::Filter) -> Result<i64, DomainError>;

    /// Cursor of the record at zero-based `position` in listing order.
    fn cursor_at(
        &self,
        filter: &Self::Filter,
        position: i64,
    ) -> Result<Option<Self::Cursor>, DomainError>;

    /// Up to `limit` records strictly after `after` (from the start when `None`).
    fn page_after(
        &self,
        filter: &Self::Filter,
        after: Option<&Self::Cursor>,
        limit: i64,
    ) -> Result<Vec<Self::Item>, DomainError>;

    fn cursor_of(item: &Self::Item) -> Self::Cursor;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based.
    pub page: i64,
    pub page_size: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
    /// The requested page was out of range and page 1 was served instead.
    pub reset: bool,
}

impl<T> Page<T> {
    pub fn total_pages(&self) -> i64 {
        total_pages(self.total, self.page_size)
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            page_size: self.page_size,
            reset: self.reset,
        }
    }
}

pub fn total_pages(total: i64, page_size: i64) -> i64 {
    if page_size <= 0 || total <= 0 {
        return 0;
    }
    (total + page_size - 1) / page_size
}

type CursorKey<F> = (F, i64, i64);

/// Resume cursors keyed by (filter, page size, page), each tagged with the
/// listing's record count when it was taken.
#[derive(Debug)]
pub struct CursorCache<F, C> {
    entries: Mutex<HashMap<CursorKey<F>, (i64, C)>>,
}

impl<F: Eq + Hash, C: Clone> CursorCache<F, C> {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// The cursor for `page`, unless the listing no longer holds `total` records.
    pub fn get(&self, filter: F, page_size: i64, page: i64, total: i64) -> Option<C> {
        match self.lock().get(&(filter, page_size, page)) {
            Some((taken_at, cursor)) if *taken_at == total => Some(cursor.clone()),
            _ => None,
        }
    }

    pub fn put(&self, filter: F, page_size: i64, page: i64, total: i64, cursor: C) {
        self.lock().insert((filter, page_size, page), (total, cursor));
    }

    /// Forget every cursor; called after the listing's membership or order changes.
    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<CursorKey<F>, (i64, C)>> {
        // A panic while holding the lock cannot leave a half-written map entry.
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<F: Eq + Hash, C: Clone> Default for CursorCache<F, C> {
    fn default() -> Self {
        Self::new()
    }
}

/// Read one page of `source`.
///
/// Pages below 1 or past the last page fall back to page 1 with `reset` set.
pub fn paginate<S: PageSource>(
    source: &S,
    cursors: &CursorCache<S::Filter, S::Cursor>,
    filter: &S::Filter,
    request: PageRequest,
) -> Result<Page<S::Item>, DomainError> {
    let page_size = request.page_size.max(1);
    let total = source.count(filter)?;
    let last_page = total_pages(total, page_size);

    let (page, reset) = if request.page < 1 || request.page > last_page {
        (1, true)
    } else {
        (request.page, false)
    };

    let items = if page == 1 {
        source.page_after(filter, None, page_size)?
    } else {
        match resume_cursor(source, cursors, filter, page, page_size, total)? {
            Some(marker) => source.page_after(filter, Some(&marker), page_size)?,
            // The listing shrank between the count and the positioned read.
            None => Vec::new(),
        }
    };

    if items.len() as i64 == page_size {
        if let Some(last) = items.last() {
            cursors.put(filter.clone(), page_size, page + 1, total, S::cursor_of(last));
        }
    }

    Ok(Page {
        items,
        total,
        page,
        page_size,
        reset,
    })
}

fn resume_cursor<S: PageSource>(
    source: &S,
    cursors: &CursorCache<S::Filter, S::Cursor>,
    filter: &S::Filter,
    page: i64,
    page_size: i64,
    total: i64,
) -> Result<Option<S::Cursor>, DomainError> {
    if let Some(cached) = cursors.get(filter.clone(), page_size, page, total) {
        return Ok(Some(cached));
    }
    let located = source.cursor_at(filter, (page - 1) * page_size - 1)?;
    if let Some(cursor) = &located {
        cursors.put(filter.clone(), page_size, page, total, cursor.clone());
    }
    Ok(located)
}
