//! `word-pager` — paginated word-list retrieval over TCP.
//!
//! # Architecture
//!
//! ```text
//!  ┌──────────────────┐  "offset,k\n"   ┌────────────┐   read   ┌───────────┐
//!  │ PaginationClient │────────────────▶│ PageServer │─────────▶│ WordList  │
//!  └────────┬─────────┘◀────────────────└────────────┘          └───────────┘
//!           │           "w1,...,wN[,EOF]\n"
//!  ┌────────▼─────────┐
//!  │  FrequencyTable  │──▶ sorted "word, count" lines
//!  └──────────────────┘
//! ```
//!
//! Each module has a single responsibility:
//! - [`store`]     — load the immutable word list
//! - [`protocol`]  — wire format (request/response parse and encode)
//! - [`server`]    — accept loop and per-connection request handling
//! - [`client`]    — pagination loop and word tallying
//! - [`frequency`] — frequency table and sorted report
//! - [`config`]    — JSON configuration and validated per-role settings
//! - [`timer`]     — optional I/O deadlines

pub mod client;
pub mod config;
pub mod frequency;
pub mod protocol;
pub mod server;
pub mod store;
pub mod timer;

pub use client::{ClientError, PaginationClient, PassSummary};
pub use config::{ClientConfig, Config, ConfigError, ServerConfig};
pub use frequency::{write_report, FrequencyTable};
pub use protocol::{PageRequest, PageResponse, ProtocolError, EOF_MARKER};
pub use server::{respond, serve, PageServer, ServerError};
pub use store::{LoadError, WordList};
