//! # Domain Layer
//!
//! Service contracts, dispatch results and errors.

pub mod errors;
pub mod outcome;
pub mod service;

pub use errors::{CallError, DispatchError, RegistrationError, ServiceError};
pub use outcome::{CloseReason, ConnectionSummary, DispatchOutcome};
pub use service::{OneWayService, RequestResponseService, ServiceFactory, ServiceInstance};
