//! Navigation capability.
//!
//! "Go to view X, optionally carrying state." The engine decides *when* to
//! navigate; where the route leads is the shell's business.

use std::collections::BTreeMap;

/// String state carried across a navigation (for example the URL of a
/// result image).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationState {
    entries: BTreeMap<String, String>,
}

impl NavigationState {
    /// Creates empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry, builder style.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    /// Sets an entry.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Looks up an entry.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Returns true if no entries are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Moves the shell to another view.
pub trait Navigator {
    /// Navigates to `route`.
    fn navigate(&mut self, route: &str, state: Option<NavigationState>);
}

/// A completed navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    /// Destination route.
    pub route: String,
    /// State carried along.
    pub state: Option<NavigationState>,
}

/// Navigator that records every call.
#[derive(Debug, Clone, Default)]
pub struct RecordingNavigator {
    visits: Vec<Navigation>,
}

impl RecordingNavigator {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every navigation so far, oldest first.
    #[must_use]
    pub fn visits(&self) -> &[Navigation] {
        &self.visits
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&mut self, route: &str, state: Option<NavigationState>) {
        tracing::debug!("Navigate -> {}", route);
        self.visits.push(Navigation {
            route: route.to_string(),
            state,
        });
    }
}
