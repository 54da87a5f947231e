use std::collections::HashMap;
use std::sync::Arc;

use crate::error::FeedError;
use crate::model::{Feed, FeedUri};

/// Supplies parsed, verified feeds
pub trait FeedProvider {
    fn get_feed(&self, uri: &FeedUri) -> Result<Arc<Feed>, FeedError>;
}

/// Feeds held in memory, e.g. already loaded by a feed manager
#[derive(Debug, Clone, Default)]
pub struct MemoryFeedProvider {
    feeds: HashMap<FeedUri, Arc<Feed>>,
}

impl MemoryFeedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a feed under its own URI
    pub fn add(&mut self, feed: Feed) -> &mut Self {
        self.feeds.insert(feed.uri.clone(), Arc::new(feed));
        self
    }

    /// Parse and register a JSON feed document
    pub fn add_json(&mut self, json: &str) -> Result<&mut Self, FeedError> {
        let feed = Feed::from_json(json).map_err(|e| FeedError::Parse {
            uri: FeedUri::new("(inline)"),
            message: e.to_string(),
        })?;
        Ok(self.add(feed))
    }

    pub fn len(&self) -> usize {
        self.feeds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.feeds.is_empty()
    }
}

impl FeedProvider for MemoryFeedProvider {
    fn get_feed(&self, uri: &FeedUri) -> Result<Arc<Feed>, FeedError> {
        self.feeds
            .get(uri)
            .cloned()
            .ok_or_else(|| FeedError::NotFound(uri.clone()))
    }
}
