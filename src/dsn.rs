//! Connection descriptors and the builder contract that mints them.
//!
//! A [`Dsn`] is a complete connection string with an auth token embedded, so it is treated as
//! a secret: formatters redact it and only [`Dsn::expose`] hands out the raw value.

pub mod signed;

pub use signed::*;

// self
use crate::_prelude::*;

/// Boxed future returned by [`DsnBuilder::build`].
pub type DsnFuture<'a, Error> = Pin<Box<dyn Future<Output = Result<Dsn, Error>> + 'a + Send>>;

/// Produces a connection string (token embedded) for a connector's configuration.
///
/// Implementations typically sign an auth token with the credential handle and splice it into a
/// driver-specific DSN. The connector treats the builder as a black box and never retries it.
pub trait DsnBuilder
where
	Self: Send + Sync,
{
	/// Opaque credential handle the builder knows how to use.
	type Credentials: Send + Sync;
	/// Failure raised while building.
	type Error: 'static + Send + Sync + StdError;

	/// Builds a connection string for the provided request.
	fn build<'a>(&'a self, request: DsnRequest<'a, Self::Credentials>)
	-> DsnFuture<'a, Self::Error>;
}

/// Shape of the connection string requested from a [`DsnBuilder`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DsnFormat {
	/// `user:token@(endpoint)/db`, leaving the protocol to the driver.
	#[default]
	Default,
	/// `user:token@tcp(endpoint)/db`, the transport-level variant network drivers expect.
	Tcp,
}
impl DsnFormat {
	/// Protocol prefix written in front of the parenthesized endpoint.
	pub const fn protocol(self) -> &'static str {
		match self {
			DsnFormat::Default => "",
			DsnFormat::Tcp => "tcp",
		}
	}

	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			DsnFormat::Default => "default",
			DsnFormat::Tcp => "tcp",
		}
	}
}
impl Display for DsnFormat {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Inputs handed to a [`DsnBuilder`], borrowed from the connector configuration.
pub struct DsnRequest<'a, K> {
	/// Database instance address (`host:port`).
	pub endpoint: &'a str,
	/// Region the instance lives in.
	pub region: &'a str,
	/// Database user the token is minted for.
	pub user: &'a str,
	/// Target database name.
	pub db_name: &'a str,
	/// Opaque credential handle.
	pub credentials: &'a K,
	/// Extra connection parameters.
	pub params: &'a BTreeMap<String, String>,
	/// Requested connection-string shape.
	pub format: DsnFormat,
}
impl<K> Clone for DsnRequest<'_, K> {
	fn clone(&self) -> Self {
		*self
	}
}
impl<K> Copy for DsnRequest<'_, K> {}
impl<K> Debug for DsnRequest<'_, K> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("DsnRequest")
			.field("endpoint", &self.endpoint)
			.field("region", &self.region)
			.field("user", &self.user)
			.field("db_name", &self.db_name)
			.field("params", &self.params)
			.field("format", &self.format)
			.finish_non_exhaustive()
	}
}

/// Redacted connection string keeping embedded tokens out of logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Dsn(String);
impl Dsn {
	/// Wraps a new connection string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the raw connection string. Callers must avoid logging this value.
	pub fn expose(&self) -> &str {
		&self.0
	}
}
impl AsRef<str> for Dsn {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Debug for Dsn {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("Dsn").field(&"<redacted>").finish()
	}
}
impl Display for Dsn {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}
