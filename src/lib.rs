//! leadsync library entrypoint.
//!
//! Modules:
//! - `extract`: pattern library, text and markup extractors
//! - `lead`: field mapping and lead assembly
//! - `pipeline`: message-to-store ingestion, single and batch
//! - `db`: migrations and the lead store
//! - `app`: configuration, startup, shared state
//! - `http`: Axum router and handlers
//! - `smtp`: SMTP intake listener
//! - `models`: typed records used across layers
//! - `util`: tracing and message decoding

pub mod app;
pub mod db;
pub mod error;
pub mod extract;
pub mod http;
pub mod lead;
pub mod models;
pub mod pipeline;
pub mod smtp;
pub mod util;
