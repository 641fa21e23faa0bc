//! The local-first conversation archive core: ingest controller, RPC
//! surface for the host shell, structured logging, and the headless smoke
//! driver. Everything here is local-only — no network calls.

pub mod controller;
pub mod logging;
pub mod rpc;
pub mod smoke;
