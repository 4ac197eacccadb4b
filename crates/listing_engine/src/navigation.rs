use std::sync::Mutex;

use listing_core::ParamBag;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NavigateOptions {
    /// Replace the current history entry instead of pushing a new one.
    pub replace: bool,
}

/// Address-bar access supplied by the routing layer.
pub trait NavigationController: Send + Sync {
    fn current_params(&self) -> ParamBag;
    fn navigate(&self, params: ParamBag, options: NavigateOptions);
}

/// In-memory history used by headless drivers and tests.
#[derive(Debug)]
pub struct MemoryNavigation {
    history: Mutex<History>,
}

#[derive(Debug)]
struct History {
    entries: Vec<ParamBag>,
    index: usize,
}

impl MemoryNavigation {
    pub fn new(initial: ParamBag) -> Self {
        Self {
            history: Mutex::new(History {
                entries: vec![initial],
                index: 0,
            }),
        }
    }

    pub fn from_query(query: &str) -> Self {
        Self::new(ParamBag::parse_query_string(query))
    }

    pub fn history_len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn current_query(&self) -> String {
        self.current_params().to_query_string()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, History> {
        self.history.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for MemoryNavigation {
    fn default() -> Self {
        Self::new(ParamBag::new())
    }
}

impl NavigationController for MemoryNavigation {
    fn current_params(&self) -> ParamBag {
        let history = self.lock();
        history.entries[history.index].clone()
    }

    fn navigate(&self, params: ParamBag, options: NavigateOptions) {
        let mut history = self.lock();
        if options.replace {
            let index = history.index;
            history.entries[index] = params;
        } else {
            let next = history.index + 1;
            history.entries.truncate(next);
            history.entries.push(params);
            history.index = next;
        }
    }
}
