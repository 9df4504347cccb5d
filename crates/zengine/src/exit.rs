use std::fmt;
use std::io;

use zengine_fetch::{FetchError, FetchErrorKind};
use zengine_rpc::RpcError;
use zengine_sdk::SdkError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;
/// Same code a shell reports for an interrupted command.
pub const ABORTED: i32 = 130;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn rpc_error(context: &str, err: RpcError) -> CliError {
    let code = match err {
        RpcError::Remote(_) => FAILURE,
        RpcError::Timeout { .. } => TIMEOUT,
        RpcError::Closed | RpcError::NotStarted | RpcError::AlreadyStarted => TRANSPORT_ERROR,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn fetch_error(context: &str, err: FetchError) -> CliError {
    let code = match err {
        FetchError::Transport(err) => return rpc_error(context, err),
        ref other => match other.kind() {
            FetchErrorKind::Abort => ABORTED,
            FetchErrorKind::InvalidRequest | FetchErrorKind::InvalidResponse => DATA_INVALID,
            FetchErrorKind::Transport | FetchErrorKind::Internal => INTERNAL,
        },
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn sdk_error(context: &str, err: SdkError) -> CliError {
    match err {
        SdkError::Rpc(err) => rpc_error(context, err),
        SdkError::Fetch(err) => fetch_error(context, err),
        other => CliError::new(DATA_INVALID, format!("{context}: {other}")),
    }
}
