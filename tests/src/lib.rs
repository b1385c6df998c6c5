//! # Hypercube Overlay Test Suite
//!
//! Cross-crate scenarios. Unit tests live next to the code in each crate.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── support.rs        # Node harness over in-memory and TCP transports
//! └── integration/
//!     ├── update_flows.rs      # position/cover-map updates end to end
//!     ├── concurrency.rs       # overlapping updates, torn-read checks
//!     ├── propagation_flows.rs # push to many peers, fetch coordinates
//!     └── tcp_runtime.rs       # node-runtime over real sockets
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p hc-tests
//! cargo test -p hc-tests integration::concurrency
//! ```

pub mod integration;
pub mod support;
