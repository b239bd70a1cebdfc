//! HTTP request handlers, one module per resource.

pub mod appointments;
pub mod auth;
pub mod checkups;
pub mod dentists;
