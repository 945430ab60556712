//! # Observability & Tracing
//!
//! Tracing setup for the harness, plus the fixed-width line formatting the run context
//! uses for its human-readable test log.
//!
//! ## Configuration
//!
//! [`setup_tracing`] installs a compact `tracing-subscriber` formatter filtered by
//! `RUST_LOG`. Module paths are hidden (`with_target(false)`); every event carries
//! structured fields such as `kind`, `label` and `id` instead.
//!
//! ```bash
//! # Test log and provisioning decisions
//! RUST_LOG=info cargo run
//!
//! # Cache hits, misses and selection paths
//! RUST_LOG=debug cargo run
//!
//! # Only the cache actors
//! RUST_LOG=conformance_coordinator::framework=debug cargo run
//! ```
//!
//! ## Test log lines
//!
//! Every line a [`RunContext`](crate::lifecycle::RunContext) writes starts with a prefix
//! built by [`log_prefix`], so lines from different suites line up in one column:
//!
//! ```text
//! INFO Mock/Local.StatelessVM.listVirtualMachines>  >>> BEGIN ---...
//! INFO Mock/Local.StatelessVM.listVirtualMachines>  Virtual machines:                     3
//! INFO .StatelessVM.listVirtualMachinesInDataCenter> Duration:                             0.012 seconds
//! ```
//!
//! Key/value lines pad the key with [`format_kv`].

/// Widest prefix body before it is cut from the left.
pub const PREFIX_WIDTH: usize = 44;
/// Widest key before it is truncated.
pub const KEY_WIDTH: usize = 36;

pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}

/// `provider/cloud.suite[.test]` followed by `"> "`, padded or cut to a fixed width.
///
/// A trailing `Test` or `Tests` is dropped from the suite name. Bodies longer than
/// [`PREFIX_WIDTH`] characters keep only their last [`PREFIX_WIDTH`] characters.
pub fn log_prefix(provider: &str, cloud: &str, suite: &str, test: Option<&str>) -> String {
    let suite = suite
        .strip_suffix("Tests")
        .or_else(|| suite.strip_suffix("Test"))
        .unwrap_or(suite);

    let mut body = format!("{provider}/{cloud}.{suite}");
    if let Some(test) = test {
        body.push('.');
        body.push_str(test);
    }

    let len = body.chars().count();
    if len > PREFIX_WIDTH {
        let tail: String = body.chars().skip(len - PREFIX_WIDTH).collect();
        format!("{tail}> ")
    } else {
        format!("{:<width$}", format!("{body}> "), width = PREFIX_WIDTH + 2)
    }
}

/// `key: ` padded to a fixed column, followed by `value`.
pub fn format_kv(key: &str, value: impl std::fmt::Display) -> String {
    if key.chars().count() > KEY_WIDTH {
        let key: String = key.chars().take(KEY_WIDTH).collect();
        format!("{key}: {value}")
    } else {
        format!("{:<width$}{value}", format!("{key}: "), width = KEY_WIDTH + 2)
    }
}
