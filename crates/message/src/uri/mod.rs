//! Parsed, normalized, immutable URI values.
//!
//! A [`Uri`] is parsed once and normalized on the way in: scheme and host are
//! lower-cased, path, query and fragment are percent-encoded against their
//! allowed character sets, and a port equal to the scheme's well-known port is
//! dropped. Every `with_*` method hands back a new value.

mod encode;
mod parse;
#[allow(clippy::module_inception, reason = "the module is named after its only type")]
mod uri;

pub use encode::filter_path;
pub use encode::filter_query_or_fragment;
pub use uri::Uri;
pub use uri::default_port;
