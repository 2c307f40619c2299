// =============================================================================
// HTTP API Module
// =============================================================================
//
// JSON endpoints consumed by the dashboard front end.

pub mod rest;
