//! Request and response bodies for the REST API.

pub mod appointments;
pub mod auth;
pub mod checkups;
pub mod dentists;
pub mod users;
