//! RPC error codes & their handling.

use jsonrpsee_types::{ErrorCode, ErrorObject, ErrorObjectOwned};

/// The result type returned by RPC handler methods.
pub type RpcResult<T> = std::result::Result<T, ErrorObjectOwned>;

/// Legacy bitcoind RPC error codes.
///
/// Drawn from the protocol table shared by bitcoind-descended nodes. Miner
/// software matches on these numeric values, so they are protocol-stable.
///
/// ## Notes
///
/// - All explicit discriminants fit within `i32`.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum LegacyCode {
    // General application defined errors
    /// Unspecified problem with the command
    #[default]
    Misc = -1,
    /// Server is in safe mode, and command is not allowed in safe mode
    ForbiddenBySafeMode = -2,
    /// Unexpected type was passed as parameter
    Type = -3,
    /// Invalid address or key
    InvalidAddressOrKey = -5,
    /// Ran out of memory during operation
    OutOfMemory = -7,
    /// Invalid, missing or duplicate parameter
    InvalidParameter = -8,
    /// Database error
    Database = -20,
    /// Error parsing or validating structure in raw format
    Deserialization = -22,
    /// General error during transaction or block submission
    Verify = -25,
    /// Transaction or block was rejected by network rules
    VerifyRejected = -26,
    /// Transaction already in chain
    VerifyAlreadyInChain = -27,
    /// Client still warming up
    InWarmup = -28,

    // P2P client errors
    /// Okapi is not connected
    ClientNotConnected = -9,
    /// Still downloading initial blocks
    ClientInInitialDownload = -10,
}

impl LegacyCode {
    /// The legacy code for an out-of-range template time.
    ///
    /// The legacy table assigns -1 to both the miscellaneous and the
    /// out-of-range condition; this alias keeps the kind name at call sites.
    pub const OUT_OF_RANGE: LegacyCode = LegacyCode::Misc;
}

impl From<LegacyCode> for ErrorCode {
    fn from(code: LegacyCode) -> Self {
        Self::ServerError(code as i32)
    }
}

/// The error a long poll handler returns when the client goes away before
/// its template becomes stale.
///
/// The transport layer must drop the request without sending a reply when a
/// handler fails with this error.
pub fn client_quit_error() -> ErrorObjectOwned {
    ErrorObject::owned(
        ErrorCode::from(LegacyCode::Misc).code(),
        "client quit before the block template changed",
        None::<()>,
    )
}

/// Returns an internal server error with `message`.
pub(crate) fn internal_error(message: impl Into<String>) -> ErrorObjectOwned {
    ErrorObject::owned(ErrorCode::InternalError.code(), message.into(), None::<()>)
}

/// A trait for mapping errors to [`ErrorObjectOwned`].
pub(crate) trait MapError<T>: Sized {
    /// Maps errors to [`ErrorObjectOwned`] with a specific error code.
    fn map_error(self, code: impl Into<ErrorCode>) -> RpcResult<T>;
}

/// A trait for conditionally converting a value into an [`RpcResult`].
pub(crate) trait OkOrError<T>: Sized {
    /// Converts the implementing type to [`RpcResult`], using an error code
    /// and message if conversion is to `Err`.
    fn ok_or_error(self, code: impl Into<ErrorCode>, message: impl ToString) -> RpcResult<T>;
}

impl<T, E> MapError<T> for Result<T, E>
where
    E: ToString,
{
    fn map_error(self, code: impl Into<ErrorCode>) -> RpcResult<T> {
        let code: ErrorCode = code.into();
        self.map_err(|error| ErrorObject::owned(code.code(), error.to_string(), None::<()>))
    }
}

impl<T> OkOrError<T> for Option<T> {
    fn ok_or_error(self, code: impl Into<ErrorCode>, message: impl ToString) -> RpcResult<T> {
        let code: ErrorCode = code.into();
        self.ok_or_else(|| ErrorObject::owned(code.code(), message.to_string(), None::<()>))
    }
}
