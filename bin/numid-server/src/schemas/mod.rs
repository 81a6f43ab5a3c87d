//! Request / response bodies of the `/api` routes.
//!
//! Field names follow the existing web client (`dataUri`, `mimeType`) so it
//! can talk to this server unchanged.

pub mod chat;
pub mod images;
pub mod vision;
