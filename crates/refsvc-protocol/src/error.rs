use thiserror::Error;

/// The backend answered with something this client does not understand.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("unexpected response to {method}: got {got}")]
    UnexpectedResponse { method: &'static str, got: &'static str },

    #[error("Unknown response status: {value} from {method}")]
    UnknownStatus { method: &'static str, value: i32 },

    #[error("missing field {field} in {method} response")]
    MissingField { method: &'static str, field: &'static str },
}
