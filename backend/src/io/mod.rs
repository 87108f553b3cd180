//! # IO Layer
//!
//! The edges of the application: the REST API consumed by the presentation
//! layer and the outbound payment gateway client.

pub mod gateway;
pub mod rest;
