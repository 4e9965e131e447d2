//! Per-row cancellation scopes.
//!
//! Every review row gets a token when its photo fetches are started. A fetch
//! carries that token back with its result; the result may only touch the
//! list if the row's scope is still open under the same token.

use std::collections::HashMap;

use tracing::debug;

use crate::event::RowId;

/// List generation; bumped by every refresh.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Generation(pub u64);

impl Generation {
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ScopeToken(u64);

#[derive(Debug, Default)]
pub struct ScopeRegistry {
    scopes: HashMap<RowId, ScopeToken>,
    next_token: u64,
}

impl ScopeRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Open (or reopen) the scope for `row`. Reopening invalidates any token
    /// handed out earlier for the same row.
    pub fn open(&mut self, row: RowId) -> ScopeToken {
        self.next_token += 1;
        let token = ScopeToken(self.next_token);
        self.scopes.insert(row, token);
        token
    }

    #[must_use]
    pub fn is_current(&self, row: RowId, token: ScopeToken) -> bool {
        self.scopes.get(&row) == Some(&token)
    }

    pub fn cancel_all(&mut self) -> usize {
        let count = self.scopes.len();
        self.scopes.clear();
        if count > 0 {
            debug!(cancelled = count, "closed all photo scopes");
        }
        count
    }
}
