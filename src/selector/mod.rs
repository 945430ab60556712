//! # Test Selection
//!
//! Decides, for each `(suite, test)` pair, whether the test runs.
//!
//! A test is assumed to run unless there is an inclusion list and the test is not on it,
//! or there is an exclusion list and the test is on it. Entries name a whole suite
//! (`StatelessVMTests`) or a single test (`StatelessVMTests.listVirtualMachines`), are
//! matched case-insensitively and only ever by exact equality.
//!
//! ```bash
//! CONFORMANCE_INCLUSIONS=StatelessVMTests.listVirtualMachines,StatelessDCTests
//! ```
//!
//! runs only `listVirtualMachines` from `StatelessVMTests` plus all of `StatelessDCTests`.
//!
//! ## Precedence
//!
//! | Inclusion match | Exclusion match | Outcome |
//! |-----------------|-----------------|---------|
//! | list set, no match | any | skip |
//! | any | `suite.test`, no test inclusion | skip |
//! | `suite.test` | `suite.test` | run (a) |
//! | `suite.test` | `suite` | run (b) |
//! | `suite` | `suite` | run (c) |
//! | none (no list) | `suite` | run |
//!
//! The second row is deliberate: an exact `suite.test` exclusion skips the test unless
//! that same `suite.test` is also included. Older notes claimed such a test still runs;
//! the branching this harness has always used says otherwise, and that branching wins.
//!
//! The last row means a bare suite entry in the exclusion list never skips anything on
//! its own. That is almost certainly a defect in the rules this harness has always
//! followed, but suites in the wild depend on it, so it is kept and reported through
//! [`RunReason::SuiteExclusionIgnored`].

use std::collections::BTreeSet;
use std::fmt;
use tracing::{debug, info};

/// Why a test was allowed to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunReason {
    /// Neither list is configured.
    Unfiltered,
    /// Nothing on the exclusion list matched.
    NotExcluded,
    /// `suite.test` is both included and excluded; inclusion wins.
    TestInclusionOverridesTestExclusion,
    /// `suite` is excluded but `suite.test` is included.
    TestInclusionOverridesSuiteExclusion,
    /// `suite` is both included and excluded.
    SuiteInclusionOverridesSuiteExclusion,
    /// `suite` is excluded with no inclusion at all, and still runs.
    SuiteExclusionIgnored,
}

/// Why a test was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// An inclusion list exists and names neither the suite nor the test.
    NotIncluded,
    /// `suite.test` is excluded and not explicitly included.
    TestExcluded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Run(RunReason),
    Skip(SkipReason),
}

impl Verdict {
    pub fn is_skip(&self) -> bool {
        matches!(self, Verdict::Skip(_))
    }
}

/// Inclusion and exclusion sets, fixed for the whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionRule {
    inclusions: Option<BTreeSet<String>>,
    exclusions: Option<BTreeSet<String>>,
}

impl SelectionRule {
    /// A rule that runs everything.
    pub fn unfiltered() -> Self {
        Self::default()
    }

    /// Build from comma-separated token lists. `None` and `""` both mean "not configured".
    pub fn parse(inclusions: Option<&str>, exclusions: Option<&str>) -> Self {
        Self {
            inclusions: inclusions.and_then(parse_tokens),
            exclusions: exclusions.and_then(parse_tokens),
        }
    }

    pub fn inclusions(&self) -> Option<&BTreeSet<String>> {
        self.inclusions.as_ref()
    }

    pub fn exclusions(&self) -> Option<&BTreeSet<String>> {
        self.exclusions.as_ref()
    }

    /// Pure decision for `(suite, test)`. `test` is `None` for suite-level checks.
    pub fn evaluate(&self, suite: &str, test: Option<&str>) -> Verdict {
        if self.inclusions.is_none() && self.exclusions.is_none() {
            return Verdict::Run(RunReason::Unfiltered);
        }
        let suite = suite.to_lowercase();
        let qualified = test.map(|t| format!("{}.{}", suite, t.to_lowercase()));

        let mut suite_included = false;
        let mut test_included = false;

        if let Some(inclusions) = &self.inclusions {
            suite_included = inclusions.contains(&suite);
            test_included = qualified
                .as_ref()
                .is_some_and(|q| inclusions.contains(q));
            if !suite_included && !test_included {
                return Verdict::Skip(SkipReason::NotIncluded);
            }
        }

        if let Some(exclusions) = &self.exclusions {
            if qualified.as_ref().is_some_and(|q| exclusions.contains(q)) {
                if !test_included {
                    return Verdict::Skip(SkipReason::TestExcluded);
                }
                self.trace("a", &suite, qualified.as_deref());
                return Verdict::Run(RunReason::TestInclusionOverridesTestExclusion);
            }
            if exclusions.contains(&suite) {
                if test_included {
                    self.trace("b", &suite, qualified.as_deref());
                    return Verdict::Run(RunReason::TestInclusionOverridesSuiteExclusion);
                }
                if suite_included {
                    self.trace("c", &suite, qualified.as_deref());
                    return Verdict::Run(RunReason::SuiteInclusionOverridesSuiteExclusion);
                }
                self.trace("ignored suite exclusion", &suite, qualified.as_deref());
                return Verdict::Run(RunReason::SuiteExclusionIgnored);
            }
        }

        self.trace("not excluded", &suite, qualified.as_deref());
        Verdict::Run(RunReason::NotExcluded)
    }

    /// Whether `(suite, test)` should be skipped, emitting one skip event when it is.
    pub fn should_skip(&self, suite: &str, test: Option<&str>) -> bool {
        match self.evaluate(suite, test) {
            Verdict::Skip(reason) => {
                info!(suite, test, ?reason, "SKIPPING");
                true
            }
            Verdict::Run(_) => false,
        }
    }

    fn trace(&self, path: &str, suite: &str, qualified: Option<&str>) {
        debug!(
            path,
            suite,
            test = qualified,
            inclusions = %Tokens(self.inclusions.as_ref()),
            exclusions = %Tokens(self.exclusions.as_ref()),
            "Executing"
        );
    }
}

fn parse_tokens(raw: &str) -> Option<BTreeSet<String>> {
    if raw.is_empty() {
        return None;
    }
    Some(
        raw.split(',')
            .map(|token| token.trim().to_lowercase())
            .filter(|token| !token.is_empty())
            .collect(),
    )
}

struct Tokens<'a>(Option<&'a BTreeSet<String>>);

impl fmt::Display for Tokens<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            None => f.write_str("-"),
            Some(set) => {
                let joined: Vec<&str> = set.iter().map(String::as_str).collect();
                write!(f, "[{}]", joined.join(","))
            }
        }
    }
}
