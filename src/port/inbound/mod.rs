//! Inbound ports (driving side): interfaces the application exposes.

pub mod valuation;
