//! Clinic appointment and referral management backend.
//!
//! The crate is laid out hexagonally: [`domain`] holds the lifecycle core
//! (referral policy, appointment state machine, consistency sweeps, history
//! access control, rating aggregation), [`inbound`] the REST adapter,
//! [`outbound`] the driven adapters, and [`server`] the wiring.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod outbound;
pub mod server;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
