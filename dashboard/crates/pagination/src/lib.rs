//! Clamped window pagination primitives.
//!
//! Panels show one bounded window of a larger ranked list at a time. The
//! helpers here never trust stored window state: every call re-derives the
//! window count from the list as it is *now* and clamps the requested index
//! back into range. A refresh that shrinks the backing list therefore moves
//! the caller to the nearest valid window instead of pointing past the end.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Window size used by the dashboard panels.
pub const DEFAULT_PAGE_SIZE: usize = 6;

/// Validated number of items per window.
///
/// # Examples
/// ```
/// use pagination::PageSize;
///
/// let size = PageSize::new(6).expect("non-zero size");
/// assert_eq!(size.get(), 6);
/// assert_eq!(PageSize::default().get(), pagination::DEFAULT_PAGE_SIZE);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct PageSize(usize);

/// Validation error returned when constructing a [`PageSize`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageSizeError {
    /// A window must hold at least one item.
    #[error("page size must be at least 1")]
    Zero,
}

impl PageSize {
    /// Construct a page size, rejecting zero.
    ///
    /// # Errors
    ///
    /// Returns [`PageSizeError::Zero`] when `value` is `0`.
    pub const fn new(value: usize) -> Result<Self, PageSizeError> {
        if value == 0 {
            return Err(PageSizeError::Zero);
        }
        Ok(Self(value))
    }

    /// Number of items per window.
    #[must_use]
    pub const fn get(self) -> usize {
        self.0
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self(DEFAULT_PAGE_SIZE)
    }
}

impl TryFrom<usize> for PageSize {
    type Error = PageSizeError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PageSize> for usize {
    fn from(value: PageSize) -> Self {
        value.get()
    }
}

/// Clamped window position over a list.
///
/// ## Invariants
/// - `index < total_windows`
/// - `total_windows >= 1`, even for an empty list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageWindow {
    /// Zero-based index of the visible window.
    pub index: usize,
    /// Total number of windows for the backing list.
    pub total_windows: usize,
}

impl PageWindow {
    /// Whether a pager control is worth rendering at all.
    #[must_use]
    pub const fn is_multi_window(&self) -> bool {
        self.total_windows > 1
    }
}

/// One visible window of a backing list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Page<'a, T> {
    /// Clamped window position.
    pub window: PageWindow,
    /// Items visible in this window.
    pub items: &'a [T],
}

/// Number of windows needed for `len` items, never less than one.
///
/// # Examples
/// ```
/// use pagination::{total_windows, PageSize};
///
/// let size = PageSize::new(6).expect("non-zero size");
/// assert_eq!(total_windows(0, size), 1);
/// assert_eq!(total_windows(6, size), 1);
/// assert_eq!(total_windows(7, size), 2);
/// ```
#[must_use]
pub fn total_windows(len: usize, page_size: PageSize) -> usize {
    len.div_ceil(page_size.get()).max(1)
}

/// Slice the window at `requested`, clamping the index into range first.
///
/// # Examples
/// ```
/// use pagination::{slice_page, PageSize};
///
/// let items: Vec<u32> = (0..8).collect();
/// let size = PageSize::new(6).expect("non-zero size");
///
/// let page = slice_page(&items, 5, size);
/// assert_eq!(page.window.index, 1);
/// assert_eq!(page.window.total_windows, 2);
/// assert_eq!(page.items, &[6, 7]);
/// ```
#[must_use]
pub fn slice_page<T>(items: &[T], requested: usize, page_size: PageSize) -> Page<'_, T> {
    let total = total_windows(items.len(), page_size);
    let index = requested.min(total - 1);
    let start = index * page_size.get();
    let end = (start + page_size.get()).min(items.len());
    Page {
        window: PageWindow {
            index,
            total_windows: total,
        },
        items: items.get(start..end).unwrap_or_default(),
    }
}

/// Step a window index against the *current* list length.
///
/// The window count is re-derived on every call, so stale indices from before
/// a refresh clamp instead of wrapping or pointing past the end.
///
/// # Examples
/// ```
/// use pagination::{advance, PageSize};
///
/// let size = PageSize::new(6).expect("non-zero size");
/// assert_eq!(advance(13, 1, 1, size), 2);
/// assert_eq!(advance(13, 2, 1, size), 2); // clamps at the last window
/// assert_eq!(advance(13, 0, -1, size), 0); // and at the first
/// ```
#[must_use]
pub fn advance(len: usize, current: usize, step: isize, page_size: PageSize) -> usize {
    let total = total_windows(len, page_size);
    let stepped = current.saturating_add_signed(step);
    stepped.min(total - 1)
}
