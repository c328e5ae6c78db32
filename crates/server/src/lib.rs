//! HTTP front end for slide deck export.

pub mod api;
pub mod config;
pub mod error;
pub mod state;
