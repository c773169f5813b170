//! Platform-facing descriptors (data) and strategies (behavior).
//!
//! `descriptor` exposes validated metadata ([`PlatformDescriptor`]) covering the HTTPS-only API
//! base and the user authorization endpoint. `strategy` defines [`PlatformStrategy`], the hook
//! the executor and OAuth sessions use to classify the `errcode` of a decoded envelope.

pub mod descriptor;
pub mod strategy;

pub use descriptor::*;
pub use strategy::*;
