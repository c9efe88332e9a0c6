//! Internal helper macros.

/// Returns early with `Err($error)` when `$predicate` does not hold.
///
/// Works like `assert!`, except the failure is reported to the caller
/// instead of panicking. Used throughout the crate for argument checks.
///
/// ```ignore
/// ensure!(code >= 100 && code <= 599, MessageError::invalid_argument("status code out of range"));
/// ```
macro_rules! ensure {
    ($predicate:expr, $error:expr) => {
        if !$predicate {
            return Err($error);
        }
    };
}

pub(crate) use ensure;
