//! Operation trait shared by every device command

use crate::error::ApiError;

/// Base trait for all WiiM API operations
///
/// An operation knows how to render its request into the raw command text
/// sent to `httpapi.asp` and how to parse the body the device answers with.
/// Operations are stateless; [`crate::WiimClient::execute`] does the I/O.
pub trait WiimOperation {
    /// Request data for this operation (`()` for plain reads)
    type Request;

    /// Typed response produced by [`WiimOperation::parse_response`]
    type Response;

    /// Command name, used for logging
    const COMMAND: &'static str;

    /// Build the raw command text from the request data
    fn build_command(request: &Self::Request) -> String;

    /// Parse the response body into the typed response
    fn parse_response(body: &str) -> Result<Self::Response, ApiError>;
}
