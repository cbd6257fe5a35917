//! Universal Search Validator command-line front end.
//!
//! Exposes the connector registry, form descriptions, request rendering and
//! bundle checking as the `usv` binary.
//!
//! # Example
//!
//! ```
//! use usv_cli::bundle::validate_bundle;
//!
//! let report = validate_bundle(&serde_json::json!({"bundles": []}));
//! assert!(!report.is_valid());
//! ```
//!
//! # Architecture
//!
//! - [`cli`]: Command definitions and output
//! - [`config`]: Environment configuration
//! - [`bundle`]: Federated Search bundle checks
//! - [`error`]: Error types and Result alias

pub mod bundle;
pub mod cli;
pub mod config;
pub mod error;

pub use bundle::{validate_bundle, BundleReport};
pub use config::CliConfig;
pub use error::{CliError, Result};
