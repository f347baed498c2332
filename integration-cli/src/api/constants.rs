//! API path constants

/// Path of the OData service below the tenant host
pub const API_PATH: &str = "/api/v1";

/// Status value of failed message processing logs
pub const STATUS_FAILED: &str = "FAILED";

/// Label for failed logs that carry no error type
pub const UNKNOWN_ERROR: &str = "Unknown Error";
