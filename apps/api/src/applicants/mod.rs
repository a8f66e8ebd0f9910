//! Applicant domain: record mapping, dual-store persistence, and the HTTP
//! surface over both.

pub mod handlers;
pub mod mapper;
pub mod postgres;
pub mod search;
pub mod store;

#[cfg(test)]
pub mod memory;

pub use store::ApplicantStore;
