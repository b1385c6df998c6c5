//! # Service Dispatch Subsystem
//!
//! **Subsystem ID:** 2
//!
//! Maps an inbound request's discriminator to a freshly created service,
//! runs it, and honors its response contract.
//!
//! ## Service Variants
//!
//! Fire-and-forget and request/response are two traits rather than a flag:
//!
//! - [`OneWayService`]: executes a side effect; the dispatcher never writes
//!   to the connection.
//! - [`RequestResponseService`]: executes and yields exactly one
//!   [`Response`](shared_types::Response), which the dispatcher sends back
//!   over the originating connection.
//!
//! ## Lifecycle
//!
//! ```text
//! receive ──► lookup(discriminator) ──► factory.create()
//!                   │                        │
//!                   ▼                        ▼
//!          UnknownService           set_request ─► execute
//!          (error reply if                   │
//!           caller waits)        ┌───────────┴────────────┐
//!                                ▼                        ▼
//!                          OneWay: done       RequestResponse: send reply
//! ```
//!
//! Registration is a startup activity: once the dispatcher serves its first
//! request the registry is frozen.

pub mod client;
pub mod dispatcher;
pub mod domain;
pub mod registry;
pub mod server;

pub use client::{call, call_as, notify};
pub use dispatcher::Dispatcher;
pub use domain::{
    CallError, CloseReason, ConnectionSummary, DispatchError, DispatchOutcome, OneWayService,
    RegistrationError, RequestResponseService, ServiceError, ServiceFactory, ServiceInstance,
};
pub use registry::ServiceRegistry;
pub use server::serve_connection;
