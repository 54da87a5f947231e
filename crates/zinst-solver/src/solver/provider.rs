use indexmap::IndexMap;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;

use crate::config::{NetworkLevel, SolverConfig};
use crate::error::FeedError;
use crate::model::{Feed, FeedPreferences, FeedUri, Implementation, InterfacePreferences, ManifestDigest};
use crate::repository::{FeedProvider, ImplementationStore, PreferencesProvider};
use crate::requirements::Requirements;

use super::candidate::SelectionCandidate;
use super::comparer::SelectionCandidateComparer;
use super::selections::ImplementationSelection;

/// Generates ranked [`SelectionCandidate`]s for the solver to choose among.
///
/// Feeds, preferences and store contents are cached on first use, so they
/// stay frozen for the lifetime of one solve. The caches are not shared
/// between threads; create one provider per solve.
pub struct CandidateProvider<'a> {
    config: &'a SolverConfig,
    feed_provider: &'a dyn FeedProvider,
    store: &'a dyn ImplementationStore,
    preferences: &'a dyn PreferencesProvider,

    feeds: RefCell<HashMap<FeedUri, Arc<Feed>>>,
    interface_preferences: RefCell<HashMap<FeedUri, InterfacePreferences>>,
    feed_preferences: RefCell<HashMap<FeedUri, FeedPreferences>>,
    stored_digests: RefCell<Option<Vec<ManifestDigest>>>,
    is_cached: RefCell<HashMap<ManifestDigest, bool>>,
    candidates: RefCell<HashMap<Requirements, Rc<[SelectionCandidate]>>>,
}

impl<'a> CandidateProvider<'a> {
    pub fn new(
        config: &'a SolverConfig,
        feed_provider: &'a dyn FeedProvider,
        store: &'a dyn ImplementationStore,
        preferences: &'a dyn PreferencesProvider,
    ) -> Self {
        Self {
            config,
            feed_provider,
            store,
            preferences,
            feeds: RefCell::new(HashMap::new()),
            interface_preferences: RefCell::new(HashMap::new()),
            feed_preferences: RefCell::new(HashMap::new()),
            stored_digests: RefCell::new(None),
            is_cached: RefCell::new(HashMap::new()),
            candidates: RefCell::new(HashMap::new()),
        }
    }

    /// All candidates for the requirements, best first
    pub fn get_sorted_candidates(&self, requirements: &Requirements) -> Result<Rc<[SelectionCandidate]>, FeedError> {
        let cached = self.candidates.borrow().get(requirements).cloned();
        if let Some(candidates) = cached {
            return Ok(candidates);
        }

        let mut candidates = Vec::new();
        for (feed_uri, feed) in self.get_feeds(requirements)? {
            let feed_preferences = self.feed_preferences(&feed_uri);
            for implementation in &feed.implementations {
                let is_cached = implementation.is_native()
                    || implementation.local_path.is_some()
                    || self.is_cached(&implementation.digest);
                let offline_uncached = self.config.network_use == NetworkLevel::Offline && !is_cached;
                candidates.push(SelectionCandidate::new(
                    feed_uri.clone(),
                    &feed_preferences,
                    Arc::clone(implementation),
                    requirements,
                    is_cached,
                    offline_uncached,
                ));
            }
        }

        let comparer = self.comparer_for(&requirements.interface);
        candidates.sort_by(|a, b| comparer.compare(a, b));

        log::trace!(
            "{} candidates for {}, {} suitable",
            candidates.len(),
            requirements,
            candidates.iter().filter(|c| c.is_suitable).count()
        );

        let candidates: Rc<[SelectionCandidate]> = candidates.into();
        self.candidates
            .borrow_mut()
            .insert(requirements.clone(), Rc::clone(&candidates));
        Ok(candidates)
    }

    /// The implementation a selection was made from
    pub fn lookup_original_implementation(
        &self,
        selection: &ImplementationSelection,
    ) -> Result<Option<Arc<Implementation>>, FeedError> {
        let feed = self.get_feed(selection.feed_uri())?;
        Ok(feed.get_implementation(&selection.id).cloned())
    }

    /// Forget everything cached so far
    pub fn clear(&self) {
        self.feeds.borrow_mut().clear();
        self.interface_preferences.borrow_mut().clear();
        self.feed_preferences.borrow_mut().clear();
        self.stored_digests.borrow_mut().take();
        self.is_cached.borrow_mut().clear();
        self.candidates.borrow_mut().clear();
    }

    /// The main feed, the user's extra feeds and every applicable referenced feed
    fn get_feeds(&self, requirements: &Requirements) -> Result<IndexMap<FeedUri, Arc<Feed>>, FeedError> {
        let mut feeds = IndexMap::new();

        self.add_feed(&mut feeds, &requirements.interface, requirements)?;
        for reference in self.interface_preferences(&requirements.interface).feeds {
            self.add_feed(&mut feeds, &reference.source, requirements)?;
        }

        Ok(feeds)
    }

    fn add_feed(
        &self,
        feeds: &mut IndexMap<FeedUri, Arc<Feed>>,
        feed_uri: &FeedUri,
        requirements: &Requirements,
    ) -> Result<(), FeedError> {
        if feeds.contains_key(feed_uri) {
            return Ok(());
        }

        let feed = self.get_feed(feed_uri)?;
        if let Some(min_version) = &feed.min_solver_version {
            if self.config.solver_version < *min_version {
                log::warn!(
                    "The solver version is too old. The feed '{}' requires at least version {} but the installed version is {}",
                    feed_uri,
                    min_version,
                    self.config.solver_version
                );
                return Ok(());
            }
        }

        feeds.insert(feed_uri.clone(), Arc::clone(&feed));
        for reference in &feed.feeds {
            if reference.applies_to(&requirements.architecture, &requirements.languages) {
                self.add_feed(feeds, &reference.source, requirements)?;
            }
        }
        Ok(())
    }

    fn get_feed(&self, feed_uri: &FeedUri) -> Result<Arc<Feed>, FeedError> {
        let cached = self.feeds.borrow().get(feed_uri).cloned();
        if let Some(feed) = cached {
            return Ok(feed);
        }

        log::debug!("Loading feed {}", feed_uri);
        let feed = self.feed_provider.get_feed(feed_uri)?;
        self.feeds
            .borrow_mut()
            .insert(feed_uri.clone(), Arc::clone(&feed));
        Ok(feed)
    }

    fn interface_preferences(&self, interface: &FeedUri) -> InterfacePreferences {
        self.interface_preferences
            .borrow_mut()
            .entry(interface.clone())
            .or_insert_with(|| self.preferences.interface_preferences(interface))
            .clone()
    }

    fn feed_preferences(&self, feed_uri: &FeedUri) -> FeedPreferences {
        self.feed_preferences
            .borrow_mut()
            .entry(feed_uri.clone())
            .or_insert_with(|| self.preferences.feed_preferences(feed_uri))
            .clone()
    }

    fn comparer_for(&self, interface: &FeedUri) -> SelectionCandidateComparer {
        let policy = self.interface_preferences(interface).stability_policy;
        SelectionCandidateComparer::for_interface(self.config, policy)
    }

    // Looked up against one snapshot of the store, taken on first use
    fn is_cached(&self, digest: &ManifestDigest) -> bool {
        if digest.is_empty() {
            return false;
        }
        if let Some(&cached) = self.is_cached.borrow().get(digest) {
            return cached;
        }

        let cached = {
            let mut stored = self.stored_digests.borrow_mut();
            stored
                .get_or_insert_with(|| self.store.list_all())
                .iter()
                .any(|d| d.partial_eq(digest))
        };
        self.is_cached.borrow_mut().insert(digest.clone(), cached);
        cached
    }
}
