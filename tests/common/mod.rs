#![allow(dead_code)]

use nhxtree::Tree;
use std::sync::Once;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Tolerance for comparing branch lengths and distances
pub const EPSILON: f64 = 1e-9;

static TEST_SETUP: Once = Once::new();

/// Installs a global fmt subscriber once; `RUST_LOG` overrides the default `warn` level.
pub fn init_test_logging() {
    TEST_SETUP.call_once(|| {
        let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        let subscriber = tracing_subscriber::registry().with(
            fmt::layer()
                .with_test_writer()
                .with_target(true)
                .with_filter(env_filter),
        );

        if !tracing::dispatcher::has_been_set() {
            subscriber.try_init().unwrap_or_else(|e| {
                eprintln!("Error: Failed to set up logging: {e}");
            });
        }
    });
}

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < EPSILON,
        "expected {expected}, got {actual}"
    );
}

/// Branch length of the reachable leaf with the given label.
pub fn leaf_length(tree: &Tree, label: &str) -> f64 {
    let leaf = tree.find_leaf(label).unwrap_or_else(|| panic!("no leaf {label}"));
    tree[leaf].branch_length()
}

/// Labels of the reachable leaves, left to right.
pub fn leaf_labels(tree: &Tree) -> Vec<String> {
    tree.leaves().map(|leaf| leaf.label().to_string()).collect()
}
