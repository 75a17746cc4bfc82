//! HTTP handlers.

pub mod record;
