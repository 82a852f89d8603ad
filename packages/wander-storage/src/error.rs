use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Failed to read {path:?}.")]
	ReadFile { path: PathBuf, source: std::io::Error },
	#[error("Failed to parse {path:?}.")]
	ParseFile { path: PathBuf, source: serde_json::Error },
	#[error("Failed to write {path:?}.")]
	WriteFile { path: PathBuf, source: std::io::Error },
	#[error("Failed to encode {path:?}.")]
	EncodeFile { path: PathBuf, source: serde_json::Error },
}
