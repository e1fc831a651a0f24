//! Runtime knobs, read from the environment.
//!
//! There is no config file: fixtures live for one test run, so the only
//! settings worth having are ones a developer flips while debugging.

use std::env;

/// Environment variable that keeps fixture directories around after the
/// owning `RootFixture` is dropped.
pub const KEEP_ENV: &str = "FIXTURE_TREE_KEEP";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FixtureConfig {
    /// Skip removal when the root fixture is dropped without an explicit
    /// `cleanup()`. The kept path is logged at `info`.
    pub keep_on_drop: bool,
}

impl FixtureConfig {
    pub fn from_env() -> Self {
        Self {
            keep_on_drop: env::var(KEEP_ENV).map(|v| is_truthy(&v)).unwrap_or(false),
        }
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
