//! Paths cross the serialization boundary as strings. A name that is not valid
//! UTF-8 is written with replacement characters instead of failing the whole
//! result it belongs to.
//!
//! Use with `#[serde(with = "crate::model::lossy_path")]`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serializer};

pub fn serialize<S: Serializer>(path: &Path, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&path.to_string_lossy())
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<PathBuf, D::Error> {
    PathBuf::deserialize(deserializer)
}
