//! IONOS Cloud API surface.
//!
//! The provider never talks HTTP directly. It goes through the [`CloudApi`]
//! trait, which has a reqwest implementation ([`HttpCloudClient`]) and an
//! in-memory fake in `ionos-mcm-testing`. Clients are resolved per tenant
//! through a [`ClientProvider`].

pub mod api;
pub mod error;
pub mod http;
pub mod models;
pub mod registry;

pub use api::CloudApi;
pub use error::{ApiError, OptionalExt};
pub use http::HttpCloudClient;
pub use models::*;
pub use registry::{ClientProvider, ClientRegistry, Credentials};
