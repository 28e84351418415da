//! EQ preset listing

use serde_json::Value;

use crate::lenient::reject_error_body;
use crate::{ApiError, WiimOperation};

/// `EQGetList`: names of the device's EQ presets
pub struct EqGetListOperation;

impl WiimOperation for EqGetListOperation {
    type Request = ();
    type Response = Vec<String>;

    const COMMAND: &'static str = "EQGetList";

    fn build_command(_request: &Self::Request) -> String {
        Self::COMMAND.to_string()
    }

    fn parse_response(body: &str) -> Result<Self::Response, ApiError> {
        let body = reject_error_body(body)?;
        let value: Value = serde_json::from_str(body)?;
        let items = value
            .as_array()
            .ok_or_else(|| ApiError::Malformed("EQ list is not an array".to_string()))?;

        Ok(items
            .iter()
            .filter_map(|item| item.as_str())
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eq_list_parsing() {
        let list = EqGetListOperation::parse_response(
            r#"["Flat", "Acoustic", "Bass Booster", "", "Vocal Booster"]"#,
        )
        .unwrap();
        assert_eq!(list, vec!["Flat", "Acoustic", "Bass Booster", "Vocal Booster"]);
    }

    #[test]
    fn test_empty_eq_list() {
        assert!(EqGetListOperation::parse_response("[]").unwrap().is_empty());
    }

    #[test]
    fn test_object_is_malformed() {
        let err = EqGetListOperation::parse_response(r#"{"status":"Failed"}"#).unwrap_err();
        assert!(err.is_malformed());
    }
}
