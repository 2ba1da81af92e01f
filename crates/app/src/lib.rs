//! Storefront cart store and its remote backends.

pub mod config;
pub mod domain;
pub mod observability;
pub mod remote;
pub mod uuids;

#[cfg(test)]
mod test;
