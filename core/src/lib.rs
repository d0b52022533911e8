//! Black-box verification harness for the pet-store REST API.
//!
//! # Overview
//! Two layers. `PetStoreClient` builds `{base}/{resource}[/{key}]` requests as
//! plain data and a `Transport` executes them. `Verifier` wraps each business
//! operation: send, assert the expected status, and on the success path issue
//! one confirmatory read showing the mutation took effect.
//!
//! # Design
//! - The client is stateless; it holds only the base URL and the static key.
//! - Transport failures are errors. HTTP error statuses are data, judged
//!   against the caller's expected status.
//! - `suite` turns the operations into ordered, named cases loadable from JSON.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod logging;
pub mod suite;
pub mod transport;
pub mod verify;

pub use client::{PetStoreClient, Resource};
pub use config::SuiteConfig;
pub use error::{CaseFileError, ClientError, TransportError, VerifyError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use suite::{Case, Key, Operation, Report};
pub use transport::{Transport, UreqTransport};
pub use verify::Verifier;
