use std::collections::HashMap;

use crate::model::{FeedPreferences, FeedUri, InterfacePreferences};

/// User preferences keyed by interface and feed URI
pub trait PreferencesProvider {
    /// Preferences for an interface; defaults when none are stored
    fn interface_preferences(&self, interface: &FeedUri) -> InterfacePreferences;

    /// Preferences for the implementations of a feed; defaults when none are stored
    fn feed_preferences(&self, feed: &FeedUri) -> FeedPreferences;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryPreferences {
    interfaces: HashMap<FeedUri, InterfacePreferences>,
    feeds: HashMap<FeedUri, FeedPreferences>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_interface(&mut self, interface: impl Into<FeedUri>, preferences: InterfacePreferences) -> &mut Self {
        self.interfaces.insert(interface.into(), preferences);
        self
    }

    pub fn set_feed(&mut self, feed: impl Into<FeedUri>, preferences: FeedPreferences) -> &mut Self {
        self.feeds.insert(feed.into(), preferences);
        self
    }
}

impl PreferencesProvider for MemoryPreferences {
    fn interface_preferences(&self, interface: &FeedUri) -> InterfacePreferences {
        self.interfaces.get(interface).cloned().unwrap_or_default()
    }

    fn feed_preferences(&self, feed: &FeedUri) -> FeedPreferences {
        self.feeds.get(feed).cloned().unwrap_or_default()
    }
}
