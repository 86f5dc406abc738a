pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Not found: {message}")]
	NotFound { message: String },
	#[error("Storage error: {message}")]
	Storage { message: String },
}
impl From<mention_storage::Error> for Error {
	fn from(err: mention_storage::Error) -> Self {
		match err {
			mention_storage::Error::Sqlx(inner) => Self::Storage { message: inner.to_string() },
			mention_storage::Error::InvalidArgument(message) => Self::InvalidRequest { message },
			mention_storage::Error::NotFound(message) => Self::NotFound { message },
		}
	}
}
