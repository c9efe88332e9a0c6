//! Case-preserving, case-insensitive header storage.
//!
//! [`HeaderBag`] keeps every header under the exact casing it was first
//! stored with while answering lookups regardless of case. Names must be RFC
//! 7230 tokens and values RFC 7230 field values; anything else is rejected
//! with [`MessageError::InvalidArgument`](crate::error::MessageError).

mod header_bag;

pub use header_bag::HeaderBag;
pub use header_bag::is_field_value;
pub use header_bag::is_token;
