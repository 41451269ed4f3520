//! JSON encoding for the session store file.
//!
//! Output is pretty-printed with two-space indentation and a trailing
//! newline. Maps in the stored types are `BTreeMap`s, so the same sessions
//! always produce the same bytes.

mod json;

pub use json::{SerializationError, from_json_bytes, to_json_stable, to_json_stable_bytes};
