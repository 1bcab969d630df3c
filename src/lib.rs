//! Multi-party meeting scheduling: availability collection, overlap
//! suggestions and finalization.

pub mod api;
pub mod cli;
pub mod core;
pub mod google;
pub mod jobs;
pub mod meetings;
pub mod scheduling;
