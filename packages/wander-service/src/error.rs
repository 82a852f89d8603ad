pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Validation(#[from] wander_index::Error),
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Invalid configuration: {message}")]
	InvalidConfig { message: String },
	#[error("Encoding error: {message}")]
	Encode { message: String },
}
