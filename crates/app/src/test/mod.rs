//! Shared fixtures for in-crate tests.

mod helpers;

pub(crate) use context::TestContext;
pub(crate) use helpers::{snapshot, usd};
