use std::cmp::Ordering;

use crate::config::{NetworkLevel, SolverConfig};
use crate::model::Stability;

use super::candidate::SelectionCandidate;

/// Ranks candidates for one interface, best first.
///
/// Ordering rules, in priority order:
/// 1. Suitable candidates before unsuitable ones
/// 2. Candidates the user marked as preferred
/// 3. Stability, where everything at least as stable as the policy ranks equal
/// 4. Cached candidates, unless network use is full
/// 5. Higher versions
/// 6. Implementation id, then feed URI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionCandidateComparer {
    network_use: NetworkLevel,
    stability_policy: Stability,
}

impl SelectionCandidateComparer {
    pub fn new(network_use: NetworkLevel, stability_policy: Stability) -> Self {
        Self {
            network_use,
            stability_policy,
        }
    }

    /// Comparer for an interface whose own stability policy may be `Unset`
    pub fn for_interface(config: &SolverConfig, interface_policy: Stability) -> Self {
        let stability_policy = match interface_policy {
            Stability::Unset if config.help_with_testing => Stability::Testing,
            Stability::Unset => Stability::Stable,
            policy => policy,
        };
        Self::new(config.network_use, stability_policy)
    }

    pub fn stability_policy(&self) -> Stability {
        self.stability_policy
    }

    pub fn compare(&self, a: &SelectionCandidate, b: &SelectionCandidate) -> Ordering {
        match (a.is_suitable, b.is_suitable) {
            (true, false) => return Ordering::Less,
            (false, true) => return Ordering::Greater,
            (false, false) => return Ordering::Equal,
            (true, true) => {}
        }

        let a_preferred = a.user_stability == Stability::Preferred;
        let b_preferred = b.user_stability == Stability::Preferred;
        b_preferred
            .cmp(&a_preferred)
            .then_with(|| self.stability_rank(a).cmp(&self.stability_rank(b)))
            .then_with(|| {
                if self.network_use == NetworkLevel::Full {
                    Ordering::Equal
                } else {
                    b.is_cached.cmp(&a.is_cached)
                }
            })
            .then_with(|| b.version().cmp(a.version()))
            .then_with(|| a.id().cmp(b.id()))
            .then_with(|| a.feed_uri.cmp(&b.feed_uri))
    }

    fn stability_rank(&self, candidate: &SelectionCandidate) -> Stability {
        candidate.effective_stability().max(self.stability_policy)
    }
}
