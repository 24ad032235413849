//! Run manifest export

pub mod json;

pub use json::{read_manifest, write_manifest, Manifest, MANIFEST_FILE_NAME};
