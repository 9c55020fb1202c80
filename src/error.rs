//! Connector-level error types shared across the builder, opener, and settings layers.

// self
use crate::_prelude::*;

/// Boxed error used wherever a collaborator's concrete error type is erased.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Result alias for [`crate::connector::Connector::open`], generic over the inner opener's error.
pub type ConnectResult<T, E> = std::result::Result<T, ConnectError<E>>;

/// Error surfaced by a connector open.
///
/// Only two things can fail: minting the connection string, or the inner opener itself. The
/// latter is carried verbatim so callers can match on their driver's own error type.
#[derive(Debug, ThisError)]
pub enum ConnectError<E>
where
	E: 'static + StdError,
{
	/// The connection-string builder failed; the cached descriptor was left untouched.
	#[error("Failed while building connection string.")]
	BuildConnectionString {
		/// Underlying builder failure.
		#[source]
		source: BoxError,
	},
	/// The inner opener failed with the freshly built or cached descriptor.
	#[error(transparent)]
	Open(E),
}
impl<E> ConnectError<E>
where
	E: 'static + StdError,
{
	/// Wraps a builder failure inside [`ConnectError`].
	pub fn build_connection_string(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::BuildConnectionString { source: Box::new(src) }
	}

	/// Returns the inner opener error, if this is an open failure.
	pub fn into_open_error(self) -> Option<E> {
		match self {
			Self::Open(e) => Some(e),
			Self::BuildConnectionString { .. } => None,
		}
	}

	/// Whether the failure happened while building the connection string.
	pub fn is_build_failure(&self) -> bool {
		matches!(self, Self::BuildConnectionString { .. })
	}
}

/// Configuration failures raised while loading connector settings.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// Settings payload could not be parsed.
	#[error("Connector settings are invalid at `{path}`.")]
	InvalidSettings {
		/// JSON path of the offending field.
		path: String,
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Token lifetime does not fit the supported duration range.
	#[error("The token lifetime of {secs} seconds exceeds the supported range.")]
	TokenLifetimeOutOfRange {
		/// Raw configured value.
		secs: u64,
	},
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[derive(Debug, ThisError)]
	#[error("Dial timed out.")]
	struct DialError;

	#[derive(Debug, ThisError)]
	#[error("Signer rejected the request.")]
	struct SignerError;

	#[test]
	fn build_failure_keeps_phase_label_and_source() {
		let err = <ConnectError<DialError>>::build_connection_string(SignerError);

		assert!(err.is_build_failure());
		assert_eq!(err.to_string(), "Failed while building connection string.");

		let source =
			StdError::source(&err).expect("Build failure should expose the builder error.");

		assert_eq!(source.to_string(), "Signer rejected the request.");
		assert!(err.into_open_error().is_none());
	}

	#[test]
	fn open_failure_is_transparent() {
		let err = ConnectError::Open(DialError);

		assert!(!err.is_build_failure());
		assert_eq!(err.to_string(), "Dial timed out.");
		assert!(matches!(err.into_open_error(), Some(DialError)));
	}
}
