//! Database record models.
//!
//! These structs are what the store implementations accept and return. They are kept distinct
//! from the API models in [`crate::api::models`] so that storage and wire representations can
//! evolve independently; notably [`users::UserDBResponse`] carries the password hash, which no
//! API model ever exposes.

pub mod appointments;
pub mod dentists;
pub mod users;
