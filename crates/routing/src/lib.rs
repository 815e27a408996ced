//! Subscription matching, output toggling, and per-message dispatch.
//!
//! Per message, in order:
//! 1. Owner toggle command check (always runs)
//! 2. Outgoing messages stop here
//! 3. Route key computation (topic-qualified or plain)
//! 4. Exact membership test against the frozen subscription set
//! 5. Concurrent fan-out to every output destination

pub mod outputs;
pub mod router;
pub mod subscription;

pub use {
    outputs::{OutputSet, Toggle},
    router::{RouteOutcome, Router},
    subscription::SubscriptionSet,
};
