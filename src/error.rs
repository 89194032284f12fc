//
// Copyright (c) 2024, 2025 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
use num_enum::TryFromPrimitive;

include!(concat!(env!("OUT_DIR"), "/ua.rs"));

pub(crate) fn sdk_version() -> &'static str {
    SDK_VERSION
}

pub(crate) fn user_agent() -> &'static str {
    USER_AGENT
}

/// The single failure shape returned by this library.
///
/// Local validation failures, rejections from the Data API and transport
/// failures all surface as a `DataApiError`. Callers should branch on
/// [`code`](DataApiError::code) (or [`kind()`](DataApiError::kind)), never on where the
/// failure came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataApiError {
    pub code: String,
    pub message: String,
}

impl std::error::Error for DataApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        None
    }
}

impl std::fmt::Display for DataApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "code={} message=\"{}\"", self.code, self.message)
    }
}

impl DataApiError {
    pub fn new(code: DataApiErrorCode, msg: &str) -> DataApiError {
        DataApiError {
            code: (code as i32).to_string(),
            message: msg.to_string(),
        }
    }

    /// Build an error from the `{code, message}` pair returned by the service.
    ///
    /// The code is kept exactly as the service sent it.
    pub fn from_wire(code: &str, msg: &str) -> DataApiError {
        DataApiError {
            code: code.to_string(),
            message: msg.to_string(),
        }
    }

    /// Map the textual code onto a known [`DataApiErrorCode`].
    ///
    /// Codes that are not numeric, or not known to this library, map to
    /// [`DataApiErrorCode::UnknownError`].
    pub fn kind(&self) -> DataApiErrorCode {
        match self.code.trim().parse::<i32>() {
            Ok(i) => DataApiErrorCode::try_from(i).unwrap_or(DataApiErrorCode::UnknownError),
            Err(_) => DataApiErrorCode::UnknownError,
        }
    }

    /// True if this error was generated locally by the transport layer
    /// (network failure or timeout) rather than by the Data API.
    pub fn is_transport(&self) -> bool {
        matches!(
            self.kind(),
            DataApiErrorCode::RequestTimeout | DataApiErrorCode::TransportError
        )
    }
}

macro_rules! ia_error {
    ($($t:tt)*) => {{
        let m = format!($($t)*);
        crate::error::DataApiError::new(
            crate::error::DataApiErrorCode::IllegalArgument,
            &format!("{} ({})", m, crate::error::sdk_version()),
        )
    }};
}

pub(crate) use ia_error;

macro_rules! ia_err {
    ($($t:tt)*) => {{
        Err(crate::error::ia_error!($($t)*))
    }};
}

pub(crate) use ia_err;

impl From<reqwest::Error> for DataApiError {
    fn from(e: reqwest::Error) -> Self {
        let mut code = DataApiErrorCode::TransportError;
        if e.is_timeout() {
            code = DataApiErrorCode::RequestTimeout;
        }
        DataApiError::new(
            code,
            &format!("reqwest error: {} ({})", e, crate::error::sdk_version()),
        )
    }
}

impl From<reqwest::header::InvalidHeaderValue> for DataApiError {
    fn from(e: reqwest::header::InvalidHeaderValue) -> Self {
        ia_error!("invalid header value: {}", e.to_string())
    }
}

impl From<url::ParseError> for DataApiError {
    fn from(e: url::ParseError) -> Self {
        ia_error!("error parsing url: {}", e.to_string())
    }
}

impl From<serde_json::Error> for DataApiError {
    fn from(e: serde_json::Error) -> Self {
        ia_error!("invalid json value: {}", e.to_string())
    }
}

// DataApiErrorCode represents the error code.
// Error codes are divided into categories as follows:
//
// 1. Codes returned by the Data API itself. The service sends these as strings
// (for example "101"); only the ones callers commonly branch on are listed here.
//
// 2. Codes generated locally by this library, starting at 10000. The service
// never returns codes in this range:
//
// 2.1 IllegalArgument is produced by request validation, before any network access.
//
// 2.2 RequestTimeout and TransportError are produced when the request could not be
// completed by the transport.
//
// 2.3 BadResponse is produced when a reply could not be understood.
//
#[derive(Debug, Clone, Copy, Eq, PartialEq, TryFromPrimitive)]
#[repr(i32)]
pub enum DataApiErrorCode {
    /// UnknownError represents an unknown error, or a code not known to this library.
    UnknownError = -1,

    /// NoError represents there is no error.
    NoError = 0,

    /// FileMissing error represents the database file could not be found.
    FileMissing = 100,

    /// RecordMissing error represents the requested record does not exist.
    RecordMissing = 101,

    /// FieldMissing error represents a referenced field does not exist on the layout.
    FieldMissing = 102,

    /// ScriptMissing error represents the requested script does not exist.
    ScriptMissing = 104,

    /// LayoutMissing error represents the requested layout does not exist.
    LayoutMissing = 105,

    /// TableMissing error represents the requested table does not exist.
    TableMissing = 106,

    /// InvalidAccount error represents the user account and/or password is invalid.
    InvalidAccount = 212,

    /// NoRecordsMatch error represents that no records match the request.
    NoRecordsMatch = 401,

    /// DateValidation error represents a date value does not meet validation entry options.
    DateValidation = 500,

    /// FieldRequiresValidValue error represents a field value failed validation.
    FieldRequiresValidValue = 509,

    /// InvalidToken error represents the session token is invalid or has expired.
    InvalidToken = 952,

    /// MaxCallsExceeded error represents the maximum number of Data API calls was exceeded.
    MaxCallsExceeded = 953,

    /// ParameterMissing error represents a required parameter was not sent.
    ParameterMissing = 958,

    /// ParameterInvalid error represents a parameter is invalid.
    ParameterInvalid = 960,

    /// UrlFormatIncorrect error represents the request url was malformed.
    UrlFormatIncorrect = 1630,

    /// ParameterValueInvalid error represents a parameter value is invalid.
    ParameterValueInvalid = 1708,

    /// IllegalArgument error represents the application provided an illegal
    /// argument for the operation. The request was never sent.
    IllegalArgument = 10001,

    /// RequestTimeout error represents the request did not complete before the
    /// given timeout elapsed.
    RequestTimeout = 10002,

    /// TransportError represents a network level failure reported by the transport.
    TransportError = 10003,

    /// BadResponse represents a reply that could not be understood.
    BadResponse = 10004,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(
            DataApiError::from_wire("101", "Record is missing").kind(),
            DataApiErrorCode::RecordMissing
        );
        assert_eq!(
            DataApiError::from_wire("31337", "?").kind(),
            DataApiErrorCode::UnknownError
        );
        assert_eq!(
            DataApiError::from_wire("ECONNRESET", "?").kind(),
            DataApiErrorCode::UnknownError
        );
        let e = DataApiError::new(DataApiErrorCode::RequestTimeout, "too slow");
        assert_eq!(e.code, "10002");
        assert!(e.is_transport());
        assert!(!DataApiError::from_wire("952", "Invalid token").is_transport());
    }

    #[test]
    fn test_ia_error_carries_version() {
        let e: Result<(), DataApiError> = ia_err!("bad {}", "value");
        let e = e.unwrap_err();
        assert_eq!(e.kind(), DataApiErrorCode::IllegalArgument);
        assert!(e.message.starts_with("bad value ("));
        assert!(e.message.contains(sdk_version()));
    }
}
