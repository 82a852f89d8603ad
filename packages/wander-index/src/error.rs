use std::fmt;

use serde::Serialize;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
	Tag,
	Destination,
}

impl fmt::Display for RecordKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Tag => f.write_str("tag"),
			Self::Destination => f.write_str("destination"),
		}
	}
}

/// Load-time rejection. A batch producing this error is never partially applied.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
	#[error("Invalid {kind} record {id:?}: {message}")]
	Validation { kind: RecordKind, id: String, message: String },
}
impl Error {
	pub(crate) fn tag(id: &str, message: impl Into<String>) -> Self {
		Self::Validation { kind: RecordKind::Tag, id: id.to_string(), message: message.into() }
	}

	pub(crate) fn destination(id: &str, message: impl Into<String>) -> Self {
		Self::Validation {
			kind: RecordKind::Destination,
			id: id.to_string(),
			message: message.into(),
		}
	}
}
