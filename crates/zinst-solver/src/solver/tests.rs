//! Solver scenarios
//!
//! Each test builds a small pool of feeds and checks which implementations
//! the backtracking solver selects.

use super::*;
use crate::config::{NetworkLevel, SolverConfig};
use crate::error::{FeedError, SolverError};
use crate::model::{
    Binding, Command, Dependency, Feed, FeedUri, Implementation, Importance, ManifestDigest, Restriction,
    Runner, Stability,
};
use crate::repository::{FeedProvider, MemoryFeedProvider, MemoryPreferences, MemoryStore};
use std::sync::Arc;
use crate::requirements::Requirements;
use zinst_version::VersionRange;

const APP: &str = "http://example.com/app";
const LIB: &str = "http://example.com/lib";
const TOOL: &str = "http://example.com/tool";
const PYTHON: &str = "http://example.com/python";
const K: &str = "http://example.com/k";

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn range(s: &str) -> VersionRange {
    VersionRange::parse(s).unwrap()
}

/// Helper to create a stable implementation with a `run` command
fn implementation(id: &str, version: &str) -> Implementation {
    Implementation::new(id, version.parse().unwrap())
        .with_stability(Stability::Stable)
        .with_digest(ManifestDigest::sha256new(id))
        .with_command(Command::new(Command::NAME_RUN).with_path(format!("bin/{}", id)))
}

/// Helper to create a dependency restricted to a version range
fn dependency(interface: &str, versions: &str) -> Dependency {
    Dependency::new(interface).with_versions(range(versions))
}

struct Fixture {
    config: SolverConfig,
    feeds: MemoryFeedProvider,
    store: MemoryStore,
    preferences: MemoryPreferences,
}

impl Fixture {
    fn new() -> Self {
        init_logging();
        Fixture {
            config: SolverConfig::default(),
            feeds: MemoryFeedProvider::new(),
            store: MemoryStore::new(),
            preferences: MemoryPreferences::new(),
        }
    }

    fn feed(&mut self, uri: &str, implementations: Vec<Implementation>) -> &mut Self {
        let feed = implementations
            .into_iter()
            .fold(Feed::new(uri), |feed, implementation| feed.with_implementation(implementation));
        self.feeds.add(feed);
        self
    }

    fn solve(&self, requirements: &Requirements) -> crate::Result<Selections> {
        let provider = CandidateProvider::new(&self.config, &self.feeds, &self.store, &self.preferences);
        BacktrackingSolver::new(&provider).solve(requirements)
    }
}

fn selected_id<'a>(selections: &'a Selections, interface: &str) -> Option<&'a str> {
    selections.get(&interface.into()).map(|s| s.id.as_str())
}

/// Every dependency recorded in the selections is met by the selection for its interface
fn assert_restrictions_hold(selections: &Selections) {
    for selection in selections.iter() {
        let dependencies = selection
            .dependencies
            .iter()
            .chain(selection.commands.iter().flat_map(|c| c.dependencies.iter()));
        for dependency in dependencies {
            if let Some(target) = selections.get(dependency.interface()) {
                assert!(
                    dependency.restriction.allows_version(&target.version),
                    "{} requires {} {:?} but {} was selected",
                    selection.id,
                    dependency.interface(),
                    dependency.restriction.versions,
                    target.version
                );
            }
        }
    }
}

#[test]
fn test_selects_single_implementation_within_range() {
    let mut fixture = Fixture::new();
    fixture.feed(
        APP,
        vec![
            implementation("app-1.0", "1.0"),
            implementation("app-1.5", "1.5"),
            implementation("app-2.0", "2.0"),
        ],
    );

    let requirements = Requirements::new(APP).with_versions(range("..!2.0"));
    let selections = fixture.solve(&requirements).unwrap();

    assert_eq!(selections.len(), 1);
    assert_eq!(selected_id(&selections, APP), Some("app-1.5"));
    assert_eq!(selections.command.as_deref(), Some("run"));
    assert!(selections.main_implementation().unwrap().contains_command("run"));
}

#[test]
fn test_stability_outranks_version() {
    let mut fixture = Fixture::new();
    fixture.feed(
        APP,
        vec![
            implementation("app-1.0", "1.0"),
            implementation("app-2.0", "2.0").with_stability(Stability::Testing),
        ],
    );
    fixture.store.add(ManifestDigest::sha256new("app-1.0"));

    let selections = fixture.solve(&Requirements::new(APP)).unwrap();
    assert_eq!(selected_id(&selections, APP), Some("app-1.0"));
}

#[test]
fn test_help_with_testing_prefers_newer_testing() {
    let mut fixture = Fixture::new();
    fixture.config = SolverConfig::default().with_help_with_testing(true);
    fixture.feed(
        APP,
        vec![
            implementation("app-1.0", "1.0"),
            implementation("app-2.0", "2.0").with_stability(Stability::Testing),
        ],
    );
    fixture.store.add(ManifestDigest::sha256new("app-1.0"));

    let selections = fixture.solve(&Requirements::new(APP)).unwrap();
    assert_eq!(selected_id(&selections, APP), Some("app-2.0"));
}

#[test]
fn test_unsatisfiable_dependency_range() {
    let mut fixture = Fixture::new();
    fixture
        .feed(APP, vec![implementation("app-1.0", "1.0").with_dependency(dependency(LIB, "<2.0"))])
        .feed(LIB, vec![implementation("lib-2.5", "2.5")]);

    let requirements = Requirements::new(APP);
    match fixture.solve(&requirements) {
        Err(SolverError::NoSolution { requirements: failed }) => assert_eq!(*failed, requirements),
        other => panic!("expected no solution, got {:?}", other),
    }
}

#[test]
fn test_disjoint_ranges_on_shared_interface() {
    let mut fixture = Fixture::new();
    fixture
        .feed(
            APP,
            vec![implementation("app-1.0", "1.0")
                .with_dependency(Dependency::new(LIB))
                .with_dependency(Dependency::new(TOOL))],
        )
        .feed(LIB, vec![implementation("lib-1.0", "1.0").with_dependency(dependency(K, "<2.0"))])
        .feed(TOOL, vec![implementation("tool-1.0", "1.0").with_dependency(dependency(K, ">=3.0"))])
        .feed(K, vec![implementation("k-1.0", "1.0"), implementation("k-3.0", "3.0")]);

    let result = fixture.solve(&Requirements::new(APP));
    assert!(result.unwrap_err().is_no_solution());
}

#[test]
fn test_restrictions_hold_in_result() {
    let mut fixture = Fixture::new();
    fixture
        .feed(
            APP,
            vec![implementation("app-1.0", "1.0")
                .with_dependency(dependency(LIB, "1.0..!3.0"))
                .with_dependency(Dependency::new(TOOL))],
        )
        .feed(TOOL, vec![implementation("tool-1.0", "1.0").with_dependency(dependency(LIB, "2.0.."))])
        .feed(
            LIB,
            vec![
                implementation("lib-1.0", "1.0"),
                implementation("lib-2.0", "2.0"),
                implementation("lib-3.0", "3.0"),
            ],
        );

    let selections = fixture.solve(&Requirements::new(APP)).unwrap();
    assert_eq!(selected_id(&selections, LIB), Some("lib-2.0"));
    assert_eq!(selections.len(), 3);
    assert_restrictions_hold(&selections);
}

#[test]
fn test_backtracks_over_demand_order() {
    let mut fixture = Fixture::new();
    fixture
        .feed(
            APP,
            vec![implementation("app-1.0", "1.0")
                .with_dependency(dependency(LIB, "1.0.."))
                .with_dependency(Dependency::new(TOOL))],
        )
        .feed(TOOL, vec![implementation("tool-1.0", "1.0").with_dependency(dependency(LIB, "..!2.0"))])
        .feed(LIB, vec![implementation("lib-1.0", "1.0"), implementation("lib-2.0", "2.0")]);

    let selections = fixture.solve(&Requirements::new(APP)).unwrap();
    assert_eq!(selected_id(&selections, LIB), Some("lib-1.0"));
    assert_eq!(selected_id(&selections, TOOL), Some("tool-1.0"));
    assert_restrictions_hold(&selections);
}

#[test]
fn test_does_not_retry_lower_ranked_candidates() {
    // lib-2.0 is chosen first and its missing dependency fails the whole demand,
    // even though lib-1.0 would have worked
    let mut fixture = Fixture::new();
    fixture
        .feed(APP, vec![implementation("app-1.0", "1.0").with_dependency(Dependency::new(LIB))])
        .feed(
            LIB,
            vec![
                implementation("lib-1.0", "1.0"),
                implementation("lib-2.0", "2.0").with_dependency(dependency(TOOL, "5.0..")),
            ],
        )
        .feed(TOOL, vec![implementation("tool-1.0", "1.0")]);

    assert!(fixture.solve(&Requirements::new(APP)).unwrap_err().is_no_solution());
}

#[test]
fn test_solving_is_deterministic() {
    let mut fixture = Fixture::new();
    fixture
        .feed(
            APP,
            vec![
                implementation("app-1.0", "1.0").with_dependency(Dependency::new(LIB)),
                implementation("app-1.1", "1.1").with_dependency(Dependency::new(LIB)),
            ],
        )
        .feed(
            LIB,
            vec![
                implementation("lib-b", "1.0"),
                implementation("lib-a", "1.0"),
                implementation("lib-c", "0.9"),
            ],
        );

    let requirements = Requirements::new(APP);
    let first = fixture.solve(&requirements).unwrap();
    let second = fixture.solve(&requirements).unwrap();

    assert_eq!(first, second);
    assert_eq!(first.to_json().unwrap(), second.to_json().unwrap());
    assert_eq!(selected_id(&first, LIB), Some("lib-a"));
}

#[test]
fn test_recommended_failure_is_tolerated() {
    let mut fixture = Fixture::new();
    fixture
        .feed(
            APP,
            vec![implementation("app-1.0", "1.0")
                .with_dependency(Dependency::new(LIB).with_importance(Importance::Recommended))],
        )
        .feed(LIB, vec![implementation("lib-1.0", "1.0").with_stability(Stability::Buggy)]);

    let selections = fixture.solve(&Requirements::new(APP)).unwrap();
    assert_eq!(selected_id(&selections, APP), Some("app-1.0"));
    assert!(!selections.contains(&LIB.into()));
}

#[test]
fn test_recommended_dependency_is_selected_when_possible() {
    let mut fixture = Fixture::new();
    fixture
        .feed(
            APP,
            vec![implementation("app-1.0", "1.0")
                .with_dependency(Dependency::new(LIB).with_importance(Importance::Recommended))],
        )
        .feed(LIB, vec![implementation("lib-1.0", "1.0")]);

    let selections = fixture.solve(&Requirements::new(APP)).unwrap();
    assert_eq!(selected_id(&selections, LIB), Some("lib-1.0"));
}

#[test]
fn test_offline_uses_cached_only() {
    let mut fixture = Fixture::new();
    fixture.config = SolverConfig::default().with_network_use(NetworkLevel::Offline);
    fixture.feed(APP, vec![implementation("app-1.0", "1.0"), implementation("app-2.0", "2.0")]);

    assert!(fixture.solve(&Requirements::new(APP)).unwrap_err().is_no_solution());

    fixture.store.add(ManifestDigest::sha256new("app-1.0"));
    let selections = fixture.solve(&Requirements::new(APP)).unwrap();
    assert_eq!(selected_id(&selections, APP), Some("app-1.0"));
    assert!(selections.uncached(&fixture.store).is_empty());
}

#[test]
fn test_cancellation() {
    let mut fixture = Fixture::new();
    fixture.feed(APP, vec![implementation("app-1.0", "1.0")]);

    let provider = CandidateProvider::new(&fixture.config, &fixture.feeds, &fixture.store, &fixture.preferences);
    let token = CancellationToken::new();
    token.cancel();
    let result = BacktrackingSolver::new(&provider)
        .with_cancellation(token)
        .solve(&Requirements::new(APP));

    assert!(matches!(result, Err(SolverError::Cancelled)));
}

/// Cancels the search as soon as one particular feed is requested
struct CancelOnFetch {
    inner: MemoryFeedProvider,
    trigger: FeedUri,
    token: CancellationToken,
}

impl FeedProvider for CancelOnFetch {
    fn get_feed(&self, uri: &FeedUri) -> Result<Arc<Feed>, FeedError> {
        if *uri == self.trigger {
            self.token.cancel();
        }
        self.inner.get_feed(uri)
    }
}

#[test]
fn test_cancellation_during_search() {
    let mut fixture = Fixture::new();
    fixture
        .feed(APP, vec![implementation("app-1.0", "1.0").with_dependency(Dependency::new(LIB))])
        .feed(LIB, vec![implementation("lib-1.0", "1.0")]);

    let token = CancellationToken::new();
    let feeds = CancelOnFetch {
        inner: fixture.feeds,
        trigger: LIB.into(),
        token: token.clone(),
    };
    let provider = CandidateProvider::new(&fixture.config, &feeds, &fixture.store, &fixture.preferences);
    let result = BacktrackingSolver::new(&provider)
        .with_cancellation(token.clone())
        .solve(&Requirements::new(APP));

    assert!(token.is_cancelled());
    assert!(matches!(result, Err(SolverError::Cancelled)));
}

#[test]
fn test_offline_accepts_local_path() {
    let mut fixture = Fixture::new();
    fixture.config = SolverConfig::default().with_network_use(NetworkLevel::Offline);
    let mut local = implementation("app-local", "1.0");
    local.local_path = Some("/opt/app".to_string());
    fixture.feed(APP, vec![local]);

    let selections = fixture.solve(&Requirements::new(APP)).unwrap();
    assert_eq!(selected_id(&selections, APP), Some("app-local"));
    assert!(selections.uncached(&fixture.store).is_empty());
}

#[test]
fn test_offline_accepts_native_package() {
    let mut fixture = Fixture::new();
    fixture.config = SolverConfig::default().with_network_use(NetworkLevel::Offline);
    fixture.feed(
        APP,
        vec![implementation("package:deb:app:1.0", "1.0")
            .with_stability(Stability::Packaged)
            .with_distribution("Debian")],
    );

    let selections = fixture.solve(&Requirements::new(APP)).unwrap();
    assert_eq!(selected_id(&selections, APP), Some("package:deb:app:1.0"));
}

#[test]
fn test_minimal_ranks_native_package_as_cached() {
    let mut fixture = Fixture::new();
    fixture.config = SolverConfig::default().with_network_use(NetworkLevel::Minimal);
    fixture.feed(
        APP,
        vec![
            implementation("app-2.0", "2.0"),
            implementation("package:deb:app:1.0", "1.0").with_distribution("Debian"),
        ],
    );

    let selections = fixture.solve(&Requirements::new(APP)).unwrap();
    assert_eq!(selected_id(&selections, APP), Some("package:deb:app:1.0"));
}

#[test]
fn test_missing_feed_is_surfaced() {
    let mut fixture = Fixture::new();
    fixture.feed(APP, vec![implementation("app-1.0", "1.0").with_dependency(Dependency::new(LIB))]);

    match fixture.solve(&Requirements::new(APP)) {
        Err(SolverError::Feed(FeedError::NotFound(uri))) => assert_eq!(uri, FeedUri::from(LIB)),
        other => panic!("expected a feed error, got {:?}", other),
    }
}

#[test]
fn test_executable_binding_in_command_is_unsupported() {
    let mut fixture = Fixture::new();
    let command = Command::new("run").with_binding(Binding::ExecutableInVar {
        name: "SELF".to_string(),
        command: None,
    });
    fixture.feed(APP, vec![Implementation::new("app-1.0", "1.0".parse().unwrap()).with_command(command)]);

    match fixture.solve(&Requirements::new(APP)) {
        Err(SolverError::UnsupportedBinding { command, interface }) => {
            assert_eq!(command, "run");
            assert_eq!(interface, FeedUri::from(APP));
        }
        other => panic!("expected an unsupported binding error, got {:?}", other),
    }
}

#[test]
fn test_runner_is_selected() {
    let mut fixture = Fixture::new();
    let command = Command::new("run").with_runner(Runner::new(PYTHON).with_versions(range("3.0..")));
    fixture
        .feed(APP, vec![Implementation::new("app-1.0", "1.0".parse().unwrap()).with_command(command)])
        .feed(
            PYTHON,
            vec![implementation("python-2.7", "2.7"), implementation("python-3.1", "3.1")],
        );

    let selections = fixture.solve(&Requirements::new(APP)).unwrap();
    let python = selections.get(&PYTHON.into()).unwrap();
    assert_eq!(python.id, "python-3.1");
    assert!(python.contains_command("run"));
}

#[test]
fn test_runner_on_same_interface_adds_command() {
    let mut fixture = Fixture::new();
    let app = Implementation::new("app-1.0", "1.0".parse().unwrap())
        .with_command(Command::new("run").with_runner(Runner::new(APP).with_command("run-core")))
        .with_command(Command::new("run-core").with_dependency(Dependency::new(LIB)));
    fixture
        .feed(APP, vec![app])
        .feed(LIB, vec![implementation("lib-1.0", "1.0")]);

    let selections = fixture.solve(&Requirements::new(APP)).unwrap();
    let app = selections.main_implementation().unwrap();
    assert!(app.contains_command("run"));
    assert!(app.contains_command("run-core"));
    assert_eq!(selected_id(&selections, LIB), Some("lib-1.0"));
}

#[test]
fn test_executable_binding_on_dependency_selects_command() {
    let mut fixture = Fixture::new();
    let dependency = Dependency::new(TOOL).with_binding(Binding::ExecutableInPath {
        name: "tool".to_string(),
        command: Some("cli".to_string()),
    });
    fixture
        .feed(APP, vec![implementation("app-1.0", "1.0").with_dependency(dependency)])
        .feed(
            TOOL,
            vec![implementation("tool-1.0", "1.0").with_command(Command::new("cli"))],
        );

    let selections = fixture.solve(&Requirements::new(APP)).unwrap();
    let tool = selections.get(&TOOL.into()).unwrap();
    assert!(tool.contains_command("cli"));
    assert!(!tool.contains_command("run"));
}

#[test]
fn test_falls_back_to_no_command() {
    let mut fixture = Fixture::new();
    fixture.feed(APP, vec![Implementation::new("lib-only", "1.0".parse().unwrap())]);

    let selections = fixture.solve(&Requirements::new(APP)).unwrap();
    assert_eq!(selections.command.as_deref(), Some(""));
    assert!(selections.main_implementation().unwrap().commands.is_empty());

    let explicit = Requirements::new(APP).with_command("run");
    assert!(fixture.solve(&explicit).unwrap_err().is_no_solution());
}

#[test]
fn test_top_level_restrictions_apply_to_dependencies() {
    let mut fixture = Fixture::new();
    fixture
        .feed(APP, vec![implementation("app-1.0", "1.0").with_dependency(Dependency::new(LIB))])
        .feed(LIB, vec![implementation("lib-1.0", "1.0"), implementation("lib-2.0", "2.0")]);

    let mut requirements = Requirements::new(APP);
    requirements.add_restriction(LIB.into(), range("..!2.0"));
    let selections = fixture.solve(&requirements).unwrap();
    assert_eq!(selected_id(&selections, LIB), Some("lib-1.0"));
}

#[test]
fn test_implementation_restrictions_are_respected() {
    let mut fixture = Fixture::new();
    fixture
        .feed(
            APP,
            vec![implementation("app-1.0", "1.0")
                .with_dependency(Dependency::new(LIB))
                .with_restriction(Restriction::new(TOOL).with_versions(range("..!2.0")))
                .with_dependency(Dependency::new(TOOL))],
        )
        .feed(LIB, vec![implementation("lib-1.0", "1.0")])
        .feed(TOOL, vec![implementation("tool-1.0", "1.0"), implementation("tool-2.0", "2.0")]);

    let selections = fixture.solve(&Requirements::new(APP)).unwrap();
    assert_eq!(selected_id(&selections, TOOL), Some("tool-1.0"));
    assert!(selections.main_implementation().unwrap().restrictions.is_empty());
}

#[test]
fn test_native_distribution_restriction() {
    let mut fixture = Fixture::new();
    let mut dependency = Dependency::new(PYTHON);
    dependency.restriction.distributions = vec!["Debian".to_string()];
    fixture
        .feed(APP, vec![implementation("app-1.0", "1.0").with_dependency(dependency)])
        .feed(
            PYTHON,
            vec![
                implementation("package:rpm:python:3.2", "3.2").with_distribution("RPM"),
                implementation("package:deb:python:3.1", "3.1").with_distribution("Debian"),
            ],
        );

    let selections = fixture.solve(&Requirements::new(APP)).unwrap();
    assert_eq!(selected_id(&selections, PYTHON), Some("package:deb:python:3.1"));
}
