//! Token-gated connector that renews the cached connection string before its token expires.
//!
//! [`Connector::open`] holds a single renewal lock while it decides whether the cached
//! connection string is still fresh and, if not, mints a new one through the
//! [`DsnBuilder`]. Concurrent callers that arrive while a build is in flight wait on that lock
//! and then reuse the freshly minted string, so at most one build runs at a time. The lock is
//! released before the physical open, which lets opens with a fresh string run in parallel.

mod stats;

pub use stats::RenewalMetrics;

// self
use crate::{
	_prelude::*,
	clock::{Clock, SystemClock},
	config::ConnectorConfig,
	dsn::{Dsn, DsnBuilder, DsnFormat, DsnRequest},
	error::{ConnectError, ConnectResult},
	obs::{self, OpenOutcome, OpenSpan, RenewalOutcome},
	opener::{OpenFuture, Opener},
};

/// Wraps an inner [`Opener`], presenting it a connection string whose token is never older than
/// the configured lifetime.
pub struct Connector<O, B>
where
	O: Opener,
	B: DsnBuilder,
{
	opener: Arc<O>,
	builder: Arc<B>,
	config: ConnectorConfig<B::Credentials>,
	clock: Arc<dyn Clock>,
	metrics: Arc<RenewalMetrics>,
	state: AsyncMutex<RenewalState>,
}
impl<O, B> Connector<O, B>
where
	O: Opener,
	B: DsnBuilder,
{
	/// Creates a connector that mints connection strings with `builder` and opens them with
	/// `opener`.
	pub fn new(
		config: ConnectorConfig<B::Credentials>,
		builder: impl Into<Arc<B>>,
		opener: impl Into<Arc<O>>,
	) -> Self {
		Self {
			opener: opener.into(),
			builder: builder.into(),
			config,
			clock: Arc::new(SystemClock),
			metrics: Default::default(),
			state: Default::default(),
		}
	}

	/// Replaces the time source used for renewal decisions.
	pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
		self.clock = clock;

		self
	}

	/// Returns the configuration the connector mints connection strings from.
	pub fn config(&self) -> &ConnectorConfig<B::Credentials> {
		&self.config
	}

	/// Returns the shared renewal counters.
	pub fn metrics(&self) -> &Arc<RenewalMetrics> {
		&self.metrics
	}

	/// Opens a connection, minting a new connection string first when the cached one is stale.
	///
	/// `name` exists for compatibility with generic opener contracts; it is only attached to the
	/// tracing span and never influences the connection string.
	///
	/// Builder failures are wrapped in [`ConnectError::BuildConnectionString`] and leave the
	/// cache untouched, so the next call retries from scratch. Inner opener failures are
	/// returned as [`ConnectError::Open`] and keep the freshly minted string cached.
	pub async fn open(&self, name: &str) -> ConnectResult<O::Connection, O::Error> {
		let span = OpenSpan::new(&self.config.endpoint, name);

		obs::record_open_outcome(OpenOutcome::Attempt);

		let result = span
			.instrument(async {
				let dsn = self.current_dsn().await?;

				self.opener.open(dsn.expose()).await.map_err(|err| {
					self.metrics.record_open_failure();

					ConnectError::Open(err)
				})
			})
			.await;

		match &result {
			Ok(_) => obs::record_open_outcome(OpenOutcome::Success),
			Err(_) => obs::record_open_outcome(OpenOutcome::Failure),
		}

		result
	}

	async fn current_dsn(&self) -> ConnectResult<Dsn, O::Error> {
		let mut state = self.state.lock().await;
		let now = self.clock.now();

		if let Some(cached) = state.fresh_at(now) {
			let dsn = cached.dsn.clone();

			self.metrics.record_reuse();
			obs::record_renewal_outcome(RenewalOutcome::Reused);
			obs::trace_renewal(RenewalOutcome::Reused, Some(cached.renew_after));

			return Ok(dsn);
		}

		let request = DsnRequest {
			endpoint: &self.config.endpoint,
			region: &self.config.region,
			user: &self.config.user,
			db_name: &self.config.db_name,
			credentials: &self.config.credentials,
			params: &self.config.params,
			format: DsnFormat::Tcp,
		};
		let dsn = match self.builder.build(request).await {
			Ok(dsn) => dsn,
			Err(err) => {
				self.metrics.record_build_failure();
				obs::record_renewal_outcome(RenewalOutcome::Failed);
				obs::trace_renewal(RenewalOutcome::Failed, state.renew_after());

				return Err(ConnectError::build_connection_string(err));
			},
		};
		let renew_after = now.saturating_add(self.config.effective_token_lifetime());

		state.cached = Some(CachedDsn { dsn: dsn.clone(), renew_after });

		self.metrics.record_build(now);
		obs::record_renewal_outcome(RenewalOutcome::Built);
		obs::trace_renewal(RenewalOutcome::Built, Some(renew_after));

		Ok(dsn)
	}
}
impl<O, B> Opener for Connector<O, B>
where
	O: Opener,
	B: DsnBuilder,
{
	type Connection = O::Connection;
	type Error = ConnectError<O::Error>;

	fn open<'a>(&'a self, name: &'a str) -> OpenFuture<'a, Self::Connection, Self::Error> {
		Box::pin(Connector::open(self, name))
	}
}
impl<O, B> Debug for Connector<O, B>
where
	O: Opener,
	B: DsnBuilder,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Connector")
			.field("config", &self.config)
			.field("metrics", &self.metrics)
			.finish_non_exhaustive()
	}
}

#[derive(Debug, Default)]
struct RenewalState {
	cached: Option<CachedDsn>,
}
impl RenewalState {
	/// Returns the cached entry if it may still be presented at `now`.
	fn fresh_at(&self, now: OffsetDateTime) -> Option<&CachedDsn> {
		self.cached.as_ref().filter(|cached| now < cached.renew_after)
	}

	fn renew_after(&self) -> Option<OffsetDateTime> {
		self.cached.as_ref().map(|cached| cached.renew_after)
	}
}

#[derive(Debug)]
struct CachedDsn {
	dsn: Dsn,
	renew_after: OffsetDateTime,
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;
	use crate::{
		_preludet::{ManualClock, RecordingOpener, ScriptedDsnBuilder},
		config::DEFAULT_TOKEN_LIFETIME,
	};

	type TestConnector = Connector<RecordingOpener, ScriptedDsnBuilder>;

	fn build(lifetime: Option<Duration>) -> (TestConnector, Arc<ManualClock>) {
		let clock = Arc::new(ManualClock::new(macros::datetime!(2025-11-10 12:00 UTC)));
		let mut config = ConnectorConfig::new(
			"orders.cluster.local:3306",
			"us-east-1",
			"app_rw",
			"orders",
			"creds".to_owned(),
		);

		if let Some(lifetime) = lifetime {
			config = config.with_token_lifetime(lifetime);
		}

		let connector =
			Connector::new(config, ScriptedDsnBuilder::default(), RecordingOpener::default())
				.with_clock(clock.clone());

		(connector, clock)
	}

	async fn renew_after(connector: &TestConnector) -> Option<OffsetDateTime> {
		connector.state.lock().await.renew_after()
	}

	#[tokio::test]
	async fn default_lifetime_sets_watermark_fourteen_minutes_out() {
		let (connector, clock) = build(None);
		let built_at = clock.now();

		connector.open("primary").await.expect("First open should succeed.");

		let watermark = renew_after(&connector).await.expect("Watermark should be set.");

		assert_eq!(watermark - built_at, DEFAULT_TOKEN_LIFETIME);
		assert_eq!(watermark - built_at, Duration::minutes(14));
		assert_eq!(connector.metrics().last_built_at(), Some(built_at));
	}

	#[tokio::test]
	async fn watermark_boundary_is_exclusive() {
		let (connector, clock) = build(Some(Duration::minutes(5)));

		connector.open("primary").await.expect("First open should succeed.");
		clock.advance(Duration::minutes(5) - Duration::nanoseconds(1));
		connector.open("primary").await.expect("Open before the watermark should succeed.");

		assert_eq!(connector.builder.calls(), 1);

		clock.advance(Duration::nanoseconds(1));
		connector.open("primary").await.expect("Open at the watermark should succeed.");

		assert_eq!(connector.builder.calls(), 2);
	}

	#[tokio::test]
	async fn failed_build_keeps_previous_watermark() {
		let (connector, clock) = build(Some(Duration::minutes(5)));

		connector.open("primary").await.expect("First open should succeed.");

		let before = renew_after(&connector).await;

		clock.advance(Duration::minutes(6));
		connector.builder.fail_next("signer unavailable");

		let err = connector.open("primary").await.expect_err("Build failure should surface.");

		assert!(err.is_build_failure());
		assert_eq!(renew_after(&connector).await, before);

		let cached = connector
			.state
			.lock()
			.await
			.cached
			.as_ref()
			.map(|cached| cached.dsn.expose().to_owned());

		assert_eq!(cached, Some("app_rw:token-1@tcp(orders.cluster.local:3306)/orders".to_owned()));
		assert_eq!(connector.metrics().build_failures(), 1);
	}

	#[tokio::test]
	async fn builder_receives_configuration_and_tcp_format() {
		let (connector, _clock) = build(None);

		connector.open("ignored-name").await.expect("Open should succeed.");

		assert_eq!(connector.builder.requests(), vec!["us-east-1/app_rw/orders/tcp".to_owned()]);
		assert_eq!(connector.opener.seen(), vec![
			"app_rw:token-1@tcp(orders.cluster.local:3306)/orders".to_owned()
		]);
	}

	#[tokio::test]
	async fn connector_is_an_opener() {
		let (connector, _clock) = build(None);
		let conn = Opener::open(&connector, "via-trait").await.expect("Open should succeed.");

		assert_eq!(conn.dsn, "app_rw:token-1@tcp(orders.cluster.local:3306)/orders");
	}
}
