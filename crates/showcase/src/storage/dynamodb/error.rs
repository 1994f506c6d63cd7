//! DynamoDB error mapping.
//!
//! Maps AWS SDK errors to `StorageError`, classifying them as transient
//! (retried by the resilient executor) or fatal (raised immediately). The
//! adapter never swallows or downgrades a failure; after retries are
//! exhausted the caller sees the original classification.

use std::fmt::Debug;

use aws_sdk_dynamodb::error::{ProvideErrorMetadata, SdkError};
use showcase_core::storage::StorageError;

/// Service error codes that indicate a transient condition.
const RETRYABLE_CODES: [&str; 7] = [
    "ProvisionedThroughputExceededException",
    "ThrottlingException",
    "Throttling",
    "RequestLimitExceeded",
    "ServiceUnavailable",
    "InternalServerError",
    "TransactionConflictException",
];

pub(crate) fn is_retryable_code(code: &str) -> bool {
    RETRYABLE_CODES.contains(&code)
}

/// Map an SDK error to `StorageError`.
///
/// Timeouts and dispatch/response failures never reached the service and
/// are always transient; service errors are classified by their error code.
pub(crate) fn map_sdk_error<E, R>(op: &'static str, err: SdkError<E, R>) -> StorageError
where
    E: ProvideErrorMetadata + Debug,
    R: Debug,
{
    match &err {
        SdkError::TimeoutError(_) => StorageError::Transient {
            code: "TimeoutError".to_string(),
            message: format!("{op} timed out"),
        },
        SdkError::DispatchFailure(_) | SdkError::ResponseError(_) => StorageError::Transient {
            code: "NetworkError".to_string(),
            message: format!("{op} failed before a service response: {err:?}"),
        },
        SdkError::ServiceError(_) => {
            let code = err.code().unwrap_or("Unknown").to_string();
            let message = err
                .message()
                .map(str::to_string)
                .unwrap_or_else(|| format!("{op} failed: {err:?}"));
            if is_retryable_code(&code) {
                StorageError::Transient { code, message }
            } else {
                StorageError::Backend { code, message }
            }
        }
        _ => StorageError::Backend {
            code: "ConstructionFailure".to_string(),
            message: format!("{op} could not be constructed: {err:?}"),
        },
    }
}
