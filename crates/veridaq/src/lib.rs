//! Intake of individual reference and recommendation requests for the Veridaq
//! dashboard: validation schema, request wizard, persistence gateway, the
//! server-side request service, and the session context it runs under.

pub mod config;
pub mod error;
pub mod requests;
pub mod session;
pub mod telemetry;
