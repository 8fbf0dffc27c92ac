//! Test doubles shared across the workspace.
//!
//! [`FakeCloud`] is an in-memory [`CloudApi`](ionos_mcm_cloud::CloudApi)
//! that accepts every call, settles on the first poll, and records what it
//! was asked to do. Tests seed it with images, IP blocks and servers, and can
//! make individual operations fail or stay busy for a number of polls.

mod fake;

pub use fake::{Call, FakeCloud, Op};
