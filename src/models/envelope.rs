//! Response envelope used by the vending API.

use serde::Deserialize;

/// `{ success, data, message }` wrapper around every vending API payload.
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamEnvelope<T> {
    #[serde(default)]
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
}

/// Error body returned by the vending API on non-2xx responses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpstreamErrorBody {
    pub message: Option<String>,
}
