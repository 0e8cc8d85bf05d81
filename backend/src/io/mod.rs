//! # IO Module
//!
//! Adapter layer between HTTP clients and the domain services: axum
//! handlers, DTO mapping and translation of domain errors into status codes.

pub mod rest;

pub use rest::*;
