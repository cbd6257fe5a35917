//! Configuration constants for connector loading and rendering
//!
//! Centralized values used throughout the crate for:
//! - Resource limits when loading connector tables and datasets
//! - Fixed literals of the request envelope
//!
//! Currently these are compile-time constants. Deployment-level settings
//! (table and dataset directories) live in the command-line front end.

/// Connector returned by `ConnectorRegistry::default_connector`.
///
/// Older form links carry no connector id and always targeted California.
pub const DEFAULT_CONNECTOR_ID: &str = "CA_ESUN";

/// Placeholder emitted in the `<Id>` element of every request.
///
/// This is a fixed literal, not a generated transaction id. Callers that own a
/// real message id can pass it to `render_with_message_id`.
pub const MESSAGE_ID_PLACEHOLDER: &str = "MARK43GENERATEDMSGID";

/// Root element of every rendered request.
pub const REQUEST_ELEMENT: &str = "Request";

/// Indentation used for child elements of the request envelope.
pub const XML_INDENT: &str = "  ";

/// Field key holding the purpose code when a table does not name one.
pub const DEFAULT_PURPOSE_CODE_FIELD: &str = "purposeCode";

/// Maximum connector table size in bytes (1 MB).
///
/// Tables are hand-maintained configuration; typical tables are 10-20 KB.
pub const MAX_TABLE_SIZE: usize = 1_000_000;

/// Maximum dataset file size in bytes (5 MB).
///
/// The vehicle make list is the largest dataset at a few hundred KB.
pub const MAX_DATASET_SIZE: u64 = 5_000_000;

/// Maximum length of any submitted value, in characters.
///
/// Applies to fields without their own `max_length`.
pub const MAX_VALUE_LENGTH: usize = 256;
