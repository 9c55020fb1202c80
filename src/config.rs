//! Connector configuration and its serde-friendly settings form.

// self
use crate::{_prelude::*, error::ConfigError};

/// Token lifetime used when none is configured.
///
/// RDS IAM tokens are valid for 15 minutes; renewing one minute early keeps the cached token out
/// of its final, possibly already expired, minute.
pub const DEFAULT_TOKEN_LIFETIME: Duration = Duration::minutes(14);

/// Everything a connector needs to mint connection strings.
///
/// Populated once before the first open and read-only afterwards.
#[derive(Clone)]
pub struct ConnectorConfig<K> {
	/// Database instance address (`host:port`).
	pub endpoint: String,
	/// Region the instance lives in.
	pub region: String,
	/// Database user; maps to the role the token authenticates as.
	pub user: String,
	/// Target database name.
	pub db_name: String,
	/// Opaque credential handle, passed through to the connection-string builder.
	pub credentials: K,
	/// Extra connection parameters appended to the connection string.
	pub params: BTreeMap<String, String>,
	/// How long a minted token is reused. `None` falls back to [`DEFAULT_TOKEN_LIFETIME`].
	pub token_lifetime: Option<Duration>,
}
impl<K> ConnectorConfig<K> {
	/// Creates a configuration with no extra parameters and the default token lifetime.
	pub fn new(
		endpoint: impl Into<String>,
		region: impl Into<String>,
		user: impl Into<String>,
		db_name: impl Into<String>,
		credentials: K,
	) -> Self {
		Self {
			endpoint: endpoint.into(),
			region: region.into(),
			user: user.into(),
			db_name: db_name.into(),
			credentials,
			params: BTreeMap::new(),
			token_lifetime: None,
		}
	}

	/// Replaces the extra connection parameters.
	pub fn with_params<I, N, V>(mut self, params: I) -> Self
	where
		I: IntoIterator<Item = (N, V)>,
		N: Into<String>,
		V: Into<String>,
	{
		self.params = params.into_iter().map(|(k, v)| (k.into(), v.into())).collect();

		self
	}

	/// Sets (or overwrites) a single connection parameter.
	pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.params.insert(name.into(), value.into());

		self
	}

	/// Overrides the token lifetime. Non-positive values leave the default in effect.
	pub fn with_token_lifetime(mut self, lifetime: Duration) -> Self {
		self.token_lifetime = Some(lifetime);

		self
	}

	/// Lifetime actually applied when a token is minted.
	pub fn effective_token_lifetime(&self) -> Duration {
		match self.token_lifetime {
			Some(lifetime) if lifetime.is_positive() => lifetime,
			_ => DEFAULT_TOKEN_LIFETIME,
		}
	}
}
impl<K> Debug for ConnectorConfig<K> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ConnectorConfig")
			.field("endpoint", &self.endpoint)
			.field("region", &self.region)
			.field("user", &self.user)
			.field("db_name", &self.db_name)
			.field("params", &self.params)
			.field("token_lifetime", &self.token_lifetime)
			.finish_non_exhaustive()
	}
}

/// Plain connector settings, typically loaded from a JSON file or environment payload.
///
/// The credential handle is not serializable and is attached via
/// [`ConnectorSettings::into_config`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConnectorSettings {
	/// Database instance address (`host:port`).
	pub endpoint: String,
	/// Region the instance lives in.
	pub region: String,
	/// Database user.
	pub user: String,
	/// Target database name.
	pub db_name: String,
	/// Extra connection parameters.
	#[serde(default)]
	pub params: BTreeMap<String, String>,
	/// Token lifetime override in seconds.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub token_lifetime_secs: Option<u64>,
}
impl ConnectorSettings {
	/// Parses settings from JSON, reporting the path of the first offending field.
	pub fn from_json_str(payload: &str) -> Result<Self, ConfigError> {
		let mut de = serde_json::Deserializer::from_str(payload);

		serde_path_to_error::deserialize(&mut de).map_err(|source| ConfigError::InvalidSettings {
			path: source.path().to_string(),
			source,
		})
	}

	/// Attaches a credential handle and produces a [`ConnectorConfig`].
	pub fn into_config<K>(self, credentials: K) -> Result<ConnectorConfig<K>, ConfigError> {
		let token_lifetime = self
			.token_lifetime_secs
			.map(|secs| {
				i64::try_from(secs)
					.map(Duration::seconds)
					.map_err(|_| ConfigError::TokenLifetimeOutOfRange { secs })
			})
			.transpose()?;

		Ok(ConnectorConfig {
			endpoint: self.endpoint,
			region: self.region,
			user: self.user,
			db_name: self.db_name,
			credentials,
			params: self.params,
			token_lifetime,
		})
	}
}
