//! [`DsnBuilder`] that splices a token from an external [`TokenSigner`] into a DSN.
//!
//! The signer owns the IAM protocol details. This builder only validates the inputs it needs,
//! asks the signer for a token, and lays out
//! `{user}:{token}@{protocol}({endpoint})/{db_name}[?{params}]`.

// crates.io
use url::form_urlencoded::Serializer;
// self
use crate::{
	_prelude::*,
	dsn::{Dsn, DsnBuilder, DsnFormat, DsnFuture, DsnRequest},
};

/// Boxed future returned by [`TokenSigner::sign`].
pub type TokenFuture<'a, Error> =
	Pin<Box<dyn Future<Output = Result<String, Error>> + 'a + Send>>;

/// Produces a signed, short-lived auth token for a database user.
pub trait TokenSigner
where
	Self: Send + Sync,
{
	/// Credential handle used to sign.
	type Credentials: Send + Sync;
	/// Failure raised while signing or retrieving credentials.
	type Error: 'static + Send + Sync + StdError;

	/// Signs a token for the provided request.
	fn sign<'a>(&'a self, request: TokenRequest<'a, Self::Credentials>)
	-> TokenFuture<'a, Self::Error>;
}

/// Inputs handed to a [`TokenSigner`].
pub struct TokenRequest<'a, K> {
	/// Database instance address (`host:port`).
	pub endpoint: &'a str,
	/// Region the instance lives in.
	pub region: &'a str,
	/// Database user the token is minted for.
	pub user: &'a str,
	/// Credential handle.
	pub credentials: &'a K,
}
impl<K> Debug for TokenRequest<'_, K> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenRequest")
			.field("endpoint", &self.endpoint)
			.field("region", &self.region)
			.field("user", &self.user)
			.finish_non_exhaustive()
	}
}

/// Errors raised by [`SignedDsnBuilder`].
#[derive(Debug, ThisError)]
pub enum SignedDsnError {
	/// A field the signer depends on was left empty.
	#[error("The {field} field must not be empty.")]
	MissingField {
		/// Name of the empty field.
		field: &'static str,
	},
	/// The signer failed to produce a token.
	#[error("Auth token could not be signed.")]
	Signer {
		/// Underlying signer failure.
		#[source]
		source: BoxError,
	},
}
impl SignedDsnError {
	/// Wraps a signer failure inside [`SignedDsnError`].
	pub fn signer(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::Signer { source: Box::new(src) }
	}
}

/// Builds connection strings around tokens minted by `S`.
#[derive(Debug)]
pub struct SignedDsnBuilder<S>
where
	S: TokenSigner,
{
	signer: Arc<S>,
}
impl<S> SignedDsnBuilder<S>
where
	S: TokenSigner,
{
	/// Creates a builder that delegates token signing to `signer`.
	pub fn new(signer: impl Into<Arc<S>>) -> Self {
		Self { signer: signer.into() }
	}

	/// Returns the wrapped signer.
	pub fn signer(&self) -> &Arc<S> {
		&self.signer
	}

	async fn build_signed(
		&self,
		request: DsnRequest<'_, S::Credentials>,
	) -> Result<Dsn, SignedDsnError> {
		Self::validate(&request)?;

		let token = self
			.signer
			.sign(TokenRequest {
				endpoint: request.endpoint,
				region: request.region,
				user: request.user,
				credentials: request.credentials,
			})
			.await
			.map_err(SignedDsnError::signer)?;

		Ok(format_dsn(
			request.user,
			&token,
			request.format,
			request.endpoint,
			request.db_name,
			request.params,
		))
	}

	fn validate(request: &DsnRequest<'_, S::Credentials>) -> Result<(), SignedDsnError> {
		for (field, value) in
			[("endpoint", request.endpoint), ("region", request.region), ("user", request.user)]
		{
			if value.trim().is_empty() {
				return Err(SignedDsnError::MissingField { field });
			}
		}

		Ok(())
	}
}
impl<S> DsnBuilder for SignedDsnBuilder<S>
where
	S: TokenSigner,
{
	type Credentials = S::Credentials;
	type Error = SignedDsnError;

	fn build<'a>(
		&'a self,
		request: DsnRequest<'a, Self::Credentials>,
	) -> DsnFuture<'a, Self::Error> {
		Box::pin(self.build_signed(request))
	}
}

/// Lays out a DSN; parameters are form-encoded in key order and omitted when empty.
pub fn format_dsn(
	user: &str,
	token: &str,
	format: DsnFormat,
	endpoint: &str,
	db_name: &str,
	params: &BTreeMap<String, String>,
) -> Dsn {
	let mut buf = format!("{user}:{token}@{}({endpoint})/{db_name}", format.protocol());

	if !params.is_empty() {
		let query = Serializer::new(String::new()).extend_pairs(params.iter()).finish();

		buf.push('?');
		buf.push_str(&query);
	}

	Dsn::new(buf)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn tcp_format_wraps_endpoint() {
		let dsn =
			format_dsn("app", "tok", DsnFormat::Tcp, "db.local:3306", "orders", &BTreeMap::new());

		assert_eq!(dsn.expose(), "app:tok@tcp(db.local:3306)/orders");
	}

	#[test]
	fn default_format_leaves_protocol_empty() {
		let dsn = format_dsn(
			"app",
			"tok",
			DsnFormat::Default,
			"db.local:3306",
			"orders",
			&BTreeMap::new(),
		);

		assert_eq!(dsn.expose(), "app:tok@(db.local:3306)/orders");
	}

	#[test]
	fn params_are_sorted_and_encoded() {
		let params = BTreeMap::from_iter([
			("tls".to_owned(), "rds ca".to_owned()),
			("allowCleartextPasswords".to_owned(), "true".to_owned()),
		]);
		let dsn = format_dsn("app", "tok", DsnFormat::Tcp, "db:3306", "orders", &params);

		assert_eq!(
			dsn.expose(),
			"app:tok@tcp(db:3306)/orders?allowCleartextPasswords=true&tls=rds+ca"
		);
	}
}
