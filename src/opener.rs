//! The opener contract every connection source implements.
//!
//! An [`Opener`] turns a connection string into a live connection. The database driver sits
//! behind it, and [`crate::connector::Connector`] implements it too, so a token-gated connector
//! can be dropped in wherever a plain opener is expected.

// self
use crate::_prelude::*;

/// Boxed future returned by [`Opener::open`].
pub type OpenFuture<'a, Conn, Error> =
	Pin<Box<dyn Future<Output = Result<Conn, Error>> + 'a + Send>>;

/// Opens a physical connection from a connection string.
pub trait Opener
where
	Self: Send + Sync,
{
	/// Connection handle produced on success.
	type Connection: Send;
	/// Failure raised by the driver.
	type Error: 'static + Send + StdError;

	/// Opens a connection using `dsn`.
	fn open<'a>(&'a self, dsn: &'a str) -> OpenFuture<'a, Self::Connection, Self::Error>;
}
