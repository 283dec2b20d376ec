//! Authenticated REST client for the portal's roster and ID-card endpoints.
//!
//! The [`CardSource`] trait is the seam the batch runner consumes: one call,
//! one round-trip, no caching, no internal retry. [`PortalClient`] is the
//! production implementation over `reqwest`; tests substitute their own
//! mocks.

pub use data::{CardKind, EntityRef, StaffMember, Student, StudentFilter, departments};
pub use error::{ClientError, Result};
pub use http::{CardSource, PortalClient};

mod data;
mod error;
mod http;
