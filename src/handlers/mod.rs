// handlers/mod.rs - Admin API handlers
//
// One module per admin resource, every handler gated by the admin
// authorization check before touching the backend.

pub mod admin;
