//! Cursor-based page accumulation guarded by an explicit state machine.
//!
//! ```text
//! Idle -> Loading -> Ready <-> FetchingNext -> Ready | Exhausted
//!            \                      \
//!             +-> Error <-----------+   (retry resumes from the last good cursor)
//! ```
//!
//! At most one request is outstanding per key. Changing the key discards every
//! accumulated page and bumps the epoch, so responses to earlier requests are
//! recognised as stale and dropped.

use crate::{FetchError, SentinelRef};

/// Opaque continuation token returned by the paged fetch capability.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cursor(String);

impl Cursor {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn token(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// `None` marks the end of results.
    pub next_cursor: Option<Cursor>,
}

/// Accumulation key: effective server filters plus page size.
#[derive(Debug, Clone, PartialEq)]
pub struct PageKey<F> {
    pub filters: F,
    pub page_size: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchPhase {
    #[default]
    Idle,
    Loading,
    Ready,
    FetchingNext,
    Exhausted,
    Error,
}

/// One outstanding page request, captured when the fetch started.
#[derive(Debug, Clone, PartialEq)]
pub struct PageRequest<F> {
    pub key: PageKey<F>,
    pub cursor: Option<Cursor>,
    epoch: u64,
}

impl<F> PageRequest<F> {
    pub fn epoch(&self) -> u64 {
        self.epoch
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    Appended {
        page_index: usize,
        item_count: usize,
        has_next_page: bool,
    },
    Failed(FetchError),
    /// The key changed while the request was outstanding.
    Discarded,
}

#[derive(Debug, Clone)]
pub struct Pagination<F, T> {
    key: Option<PageKey<F>>,
    epoch: u64,
    pages: Vec<Vec<T>>,
    cursor: Option<Cursor>,
    phase: FetchPhase,
    error: Option<FetchError>,
}

impl<F, T> Default for Pagination<F, T> {
    fn default() -> Self {
        Self {
            key: None,
            epoch: 0,
            pages: Vec::new(),
            cursor: None,
            phase: FetchPhase::Idle,
            error: None,
        }
    }
}

impl<F: Clone + PartialEq, T> Pagination<F, T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn phase(&self) -> FetchPhase {
        self.phase
    }

    pub fn error(&self) -> Option<&FetchError> {
        self.error.as_ref()
    }

    /// Returns true when the key changed and the accumulator was reset.
    pub fn set_key(&mut self, key: PageKey<F>) -> bool {
        if self.key.as_ref() == Some(&key) {
            return false;
        }
        self.restart(Some(key));
        true
    }

    /// Forgets the key and every page (unmount).
    pub fn clear(&mut self) {
        self.restart(None);
    }

    fn restart(&mut self, key: Option<PageKey<F>>) {
        self.key = key;
        self.epoch += 1;
        self.pages.clear();
        self.cursor = None;
        self.phase = FetchPhase::Idle;
        self.error = None;
    }

    /// Starts the next request if the current phase allows one.
    ///
    /// `Loading`, `FetchingNext` and `Exhausted` refuse; `Error` retries from the
    /// last good cursor.
    pub fn begin_fetch(&mut self) -> Option<PageRequest<F>> {
        let key = self.key.clone()?;
        let (phase, cursor) = match self.phase {
            FetchPhase::Loading | FetchPhase::FetchingNext | FetchPhase::Exhausted => return None,
            FetchPhase::Idle => (FetchPhase::Loading, None),
            FetchPhase::Ready => (FetchPhase::FetchingNext, self.cursor.clone()),
            FetchPhase::Error if self.pages.is_empty() => (FetchPhase::Loading, None),
            FetchPhase::Error => (FetchPhase::FetchingNext, self.cursor.clone()),
        };
        self.phase = phase;
        self.error = None;
        Some(PageRequest {
            key,
            cursor,
            epoch: self.epoch,
        })
    }

    pub fn is_current(&self, request: &PageRequest<F>) -> bool {
        request.epoch == self.epoch && self.key.as_ref() == Some(&request.key)
    }

    pub fn complete(
        &mut self,
        request: &PageRequest<F>,
        result: Result<Page<T>, FetchError>,
    ) -> Completion {
        if !self.is_current(request) {
            return Completion::Discarded;
        }
        match result {
            Ok(page) => {
                let item_count = page.items.len();
                self.pages.push(page.items);
                self.cursor = page.next_cursor;
                let has_next_page = self.cursor.is_some();
                self.phase = if has_next_page {
                    FetchPhase::Ready
                } else {
                    FetchPhase::Exhausted
                };
                Completion::Appended {
                    page_index: self.pages.len() - 1,
                    item_count,
                    has_next_page,
                }
            }
            Err(err) => {
                // Pages and cursor are kept so a retry resumes where this failed.
                self.phase = FetchPhase::Error;
                self.error = Some(err.clone());
                Completion::Failed(err)
            }
        }
    }

    /// Items in fetch order.
    pub fn items(&self) -> impl Iterator<Item = &T> {
        self.pages.iter().flatten()
    }

    pub fn item_count(&self) -> usize {
        self.pages.iter().map(Vec::len).sum()
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn has_next_page(&self) -> bool {
        match self.phase {
            FetchPhase::Exhausted => false,
            _ => self.key.is_some() && (self.pages.is_empty() || self.cursor.is_some()),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.phase == FetchPhase::Loading
    }

    pub fn is_fetching_next_page(&self) -> bool {
        self.phase == FetchPhase::FetchingNext
    }

    /// Identity of the last accumulated item; changes with every new page or reset.
    pub fn sentinel(&self) -> Option<SentinelRef> {
        self.item_count()
            .checked_sub(1)
            .map(|index| SentinelRef::new(self.epoch, index))
    }
}
