//! # Conformance Coordinator
//!
//! > **Test selection and shared cloud resources for a provider conformance suite.**
//!
//! A conformance run executes hundreds of tests against one cloud. This crate decides
//! which of them run, and hands them a pool of lazily provisioned resources (virtual
//! machines, volumes, firewalls, subnets, keypairs, static IPs) so that tests reuse one
//! instance per role instead of each creating their own.
//!
//! ## 🏗️ Design Philosophy
//!
//! ### One actor per resource kind
//!
//! Every [`ResourceKind`](model::ResourceKind) gets a
//! [`LabelCacheActor`](framework::LabelCacheActor) running in its own Tokio task. The
//! actor owns that kind's `(label, scope) -> id` cache and handles lookups one at a time,
//! so "check, provision, record" is a critical section per kind without a single lock.
//! Lookups for different kinds never wait on each other.
//!
//! ### Labels
//!
//! | Label | Provisioned? | Deleted at teardown? |
//! |-------|--------------|----------------------|
//! | `stateful` | on demand, once per run | yes |
//! | `stateless` | never; discovered | no |
//! | `removed` | on demand | yes, if the test did not already |
//! | anything else | on demand, exclusive to one test | yes |
//!
//! ### Late binding
//!
//! The [`ResourceProvisioner`](framework::ResourceProvisioner) is injected through
//! `run()` rather than at construction, so actors can be built before a provider
//! connection exists and tests can swap in a mock.
//!
//! ## 🗺️ Module Tour
//!
//! ### 1. The Engine ([`framework`])
//! - **Role**: Per-kind cache actors, their clients and the provisioning trait.
//! - **Key items**: [`LabelCacheActor`](framework::LabelCacheActor),
//!   [`ResourceLabelCache`](framework::ResourceLabelCache),
//!   [`ResourceProvisioner`](framework::ResourceProvisioner).
//!
//! ### 2. The Interface ([`clients`])
//! - **Role**: Typed lookups per resource family, including the VLAN firewall
//!   placement check and the firewall capability query.
//! - **Key items**: [`ComputeClient`](clients::ComputeClient),
//!   [`NetworkClient`](clients::NetworkClient), [`IdentityClient`](clients::IdentityClient).
//!
//! ### 3. The Orchestrator ([`lifecycle`])
//! - **Role**: Starts and tears down the actors, owns the run-wide state, and gives
//!   every suite its own context.
//! - **Key items**: [`SharedResourceManager`](lifecycle::SharedResourceManager),
//!   [`ConformanceHarness`](lifecycle::ConformanceHarness),
//!   [`RunContext`](lifecycle::RunContext).
//!
//! ### 4. Selection ([`selector`])
//! - **Role**: Inclusion/exclusion lists and their precedence rules.
//!
//! ### 5. Collaborators ([`provider`], [`config`], [`accounting`])
//! - **Role**: Provider registry, environment configuration, API call counters.
//!
//! ## 🚀 Quick Start
//!
//! ```bash
//! # Demo run against the in-memory provider
//! RUST_LOG=info cargo run
//!
//! # Only one suite
//! CONFORMANCE_INCLUSIONS=StatelessVMTests RUST_LOG=info cargo run
//! ```
//!
//! ### Running Tests
//!
//! ```bash
//! cargo test
//! ```

pub mod accounting;
pub mod clients;
pub mod config;
pub mod framework;
pub mod lifecycle;
pub mod model;
pub mod provider;
pub mod selector;
