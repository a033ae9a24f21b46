//! Session-scoped state
//!
//! A `Session` owns the extraction history and the user profile for one
//! logical user session. It is passed explicitly into the operations that
//! read or modify it.

pub mod history;
pub mod profile;

pub use history::{HistoryEntry, HistoryStore, TIMESTAMP_FORMAT};
pub use profile::Profile;

use crate::language::Language;

#[derive(Debug, Default)]
pub struct Session {
    history: HistoryStore,
    profile: Profile,
}

impl Session {
    pub fn new(default_language: Language) -> Self {
        Self {
            history: HistoryStore::new(),
            profile: Profile::with_language(default_language),
        }
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut HistoryStore {
        &mut self.history
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn profile_mut(&mut self) -> &mut Profile {
        &mut self.profile
    }
}
