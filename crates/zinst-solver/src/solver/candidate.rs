use std::sync::Arc;

use zinst_version::ImplementationVersion;

use crate::model::{languages_intersect, FeedPreferences, FeedUri, Implementation, Stability};
use crate::requirements::Requirements;

use super::selections::ImplementationSelection;

/// An implementation considered for a set of requirements, with the facts
/// needed to rank it and the verdict on whether it may be chosen at all.
#[derive(Debug, Clone)]
pub struct SelectionCandidate {
    /// Feed the implementation was found in
    pub feed_uri: FeedUri,
    pub implementation: Arc<Implementation>,
    /// Rating set by the user, `Unset` if none
    pub user_stability: Stability,
    /// Already present in the implementation store
    pub is_cached: bool,
    /// Offline and not in the store, so it cannot be fetched
    pub offline_uncached: bool,
    pub is_suitable: bool,
    /// Why the candidate is unsuitable
    pub notes: Option<String>,
}

impl SelectionCandidate {
    pub fn new(
        feed_uri: FeedUri,
        feed_preferences: &FeedPreferences,
        implementation: Arc<Implementation>,
        requirements: &Requirements,
        is_cached: bool,
        offline_uncached: bool,
    ) -> Self {
        let user_stability = feed_preferences.user_stability(&implementation.id);
        let mut candidate = SelectionCandidate {
            feed_uri,
            implementation,
            user_stability,
            is_cached,
            offline_uncached,
            is_suitable: true,
            notes: None,
        };
        if let Some(reason) = candidate.unsuitable_reason(requirements) {
            candidate.is_suitable = false;
            candidate.notes = Some(reason);
        }
        candidate
    }

    pub fn id(&self) -> &str {
        &self.implementation.id
    }

    pub fn version(&self) -> &ImplementationVersion {
        &self.implementation.version
    }

    /// The user's rating if set, otherwise the declared one
    pub fn effective_stability(&self) -> Stability {
        match (self.user_stability, self.implementation.stability) {
            (Stability::Unset, Stability::Unset) => Stability::Testing,
            (Stability::Unset, declared) => declared,
            (user, _) => user,
        }
    }

    /// Whether an existing selection was made from this candidate
    pub fn is_selected_as(&self, selection: &ImplementationSelection) -> bool {
        self.implementation.id == selection.id && self.feed_uri == *selection.feed_uri()
    }

    fn unsuitable_reason(&self, requirements: &Requirements) -> Option<String> {
        let implementation = &self.implementation;

        if !implementation.architecture.is_compatible(&requirements.architecture) {
            return Some(format!(
                "Architecture {} is not compatible with {}",
                implementation.architecture, requirements.architecture
            ));
        }

        if let Some(range) = requirements.restriction_for(&requirements.interface) {
            if !range.matches(&implementation.version) {
                return Some(format!("Version {} does not match {}", implementation.version, range));
            }
        }

        let command = requirements.command_name();
        if !command.is_empty() && implementation.command(command).is_none() {
            return Some(format!("No command named '{}'", command));
        }

        let stability = self.effective_stability();
        if !stability.is_usable() {
            return Some(format!("Stability is {}", stability));
        }

        if let Some(distribution) = &implementation.distribution {
            if !requirements.distributions.is_empty() && !requirements.distributions.contains(distribution) {
                return Some(format!("Distribution {} is not allowed", distribution));
            }
        }

        if !languages_intersect(&implementation.languages, &requirements.languages) {
            return Some("None of the requested languages are supported".to_string());
        }

        if self.offline_uncached {
            return Some("Not cached and network use is offline".to_string());
        }

        None
    }
}
