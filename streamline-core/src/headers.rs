//! Opaque header metadata carried by readers.
//!
//! Devices that wrap framed sub-streams (e.g. a MIME-multipart part
//! reader, layered on top of this crate) attach a string-to-string map to
//! the reader they hand out. The core treats it as opaque and passes it
//! through unchanged: `map`/`filter`/`limit`/etc. preserve the upstream
//! reader's headers on the downstream reader (header passthrough).

use hashbrown::HashMap;

/// Opaque header map attached to a reader.
pub type Headers = HashMap<String, String>;

/// Build an empty header map; exists only to avoid `HashMap::new()` import
/// churn at call sites that just want "no headers."
#[must_use]
pub fn empty_headers() -> Headers {
    HashMap::new()
}
