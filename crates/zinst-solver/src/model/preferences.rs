use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{FeedReference, Stability};

/// User settings for one interface
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct InterfacePreferences {
    /// Overrides the global stability policy when set
    #[serde(default)]
    pub stability_policy: Stability,
    /// Additional feeds registered by the user
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub feeds: Vec<FeedReference>,
}

/// User settings for one implementation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ImplementationPreferences {
    #[serde(default)]
    pub user_stability: Stability,
}

/// User settings for the implementations of one feed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedPreferences {
    #[serde(default)]
    pub implementations: BTreeMap<String, ImplementationPreferences>,
}

impl FeedPreferences {
    /// The user's rating for an implementation, `Unset` if none
    pub fn user_stability(&self, id: &str) -> Stability {
        self.implementations
            .get(id)
            .map(|p| p.user_stability)
            .unwrap_or_default()
    }

    pub fn set_user_stability(&mut self, id: impl Into<String>, stability: Stability) {
        self.implementations.entry(id.into()).or_default().user_stability = stability;
    }
}
