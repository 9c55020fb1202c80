//! Token-gated database connector that mints short-lived RDS IAM auth tokens on demand, caches
//! the resulting connection string, and renews it before the token expires.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod clock;
pub mod config;
pub mod connector;
pub mod dsn;
pub mod error;
pub mod obs;
pub mod opener;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and scripted collaborators for tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// std
	use std::sync::atomic::{AtomicUsize, Ordering};
	// crates.io
	use async_lock::Semaphore;
	// self
	use crate::{
		clock::Clock,
		dsn::{Dsn, DsnBuilder, DsnFuture, DsnRequest},
		opener::{OpenFuture, Opener},
	};

	/// Clock frozen at a caller-controlled instant.
	#[derive(Debug)]
	pub struct ManualClock(Mutex<OffsetDateTime>);
	impl ManualClock {
		/// Creates a clock pinned to `start`.
		pub fn new(start: OffsetDateTime) -> Self {
			Self(Mutex::new(start))
		}

		/// Moves the clock forward (or backward, for negative durations).
		pub fn advance(&self, by: Duration) {
			*self.0.lock() += by;
		}

		/// Pins the clock to `instant`.
		pub fn set(&self, instant: OffsetDateTime) {
			*self.0.lock() = instant;
		}
	}
	impl Clock for ManualClock {
		fn now(&self) -> OffsetDateTime {
			*self.0.lock()
		}
	}

	/// Error returned by [`ScriptedDsnBuilder`] when told to fail.
	#[derive(Debug, ThisError)]
	#[error("Scripted builder failure: {0}.")]
	pub struct ScriptedBuildError(pub String);

	/// Builder that returns `{user}:token-{n}@tcp({endpoint})/{db_name}` and counts invocations.
	///
	/// Failures can be queued with [`ScriptedDsnBuilder::fail_next`]. A gated builder parks every
	/// build until [`ScriptedDsnBuilder::open_gate`] is called, which lets concurrency tests pile
	/// callers up behind the renewal lock.
	#[derive(Default)]
	pub struct ScriptedDsnBuilder {
		calls: AtomicUsize,
		failures: Mutex<Vec<String>>,
		gate: Option<Semaphore>,
		requests: Mutex<Vec<String>>,
	}
	impl ScriptedDsnBuilder {
		/// Creates a builder whose builds block until the gate is opened.
		pub fn gated() -> Self {
			Self { gate: Some(Semaphore::new(0)), ..Default::default() }
		}

		/// Lets parked and future builds through.
		pub fn open_gate(&self) {
			if let Some(gate) = &self.gate {
				gate.add_permits(1);
			}
		}

		/// Makes the next build fail with `message`.
		pub fn fail_next(&self, message: impl Into<String>) {
			self.failures.lock().push(message.into());
		}

		/// Number of build invocations, including failed ones.
		pub fn calls(&self) -> usize {
			self.calls.load(Ordering::SeqCst)
		}

		/// Summary (`region/user/db_name/format`) of every request received.
		pub fn requests(&self) -> Vec<String> {
			self.requests.lock().clone()
		}
	}
	impl Debug for ScriptedDsnBuilder {
		fn fmt(&self, f: &mut Formatter) -> FmtResult {
			f.debug_struct("ScriptedDsnBuilder")
				.field("calls", &self.calls())
				.field("gated", &self.gate.is_some())
				.finish()
		}
	}
	impl DsnBuilder for ScriptedDsnBuilder {
		type Credentials = String;
		type Error = ScriptedBuildError;

		fn build<'a>(
			&'a self,
			request: DsnRequest<'a, Self::Credentials>,
		) -> DsnFuture<'a, Self::Error> {
			Box::pin(async move {
				let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;

				self.requests.lock().push(format!(
					"{}/{}/{}/{}",
					request.region, request.user, request.db_name, request.format
				));

				if let Some(gate) = &self.gate {
					let _permit = gate.acquire().await;
				}

				let failure = self.failures.lock().pop();

				if let Some(message) = failure {
					return Err(ScriptedBuildError(message));
				}

				Ok(Dsn::new(format!(
					"{}:token-{n}@tcp({})/{}",
					request.user, request.endpoint, request.db_name
				)))
			})
		}
	}

	/// Error returned by [`RecordingOpener`] when told to fail.
	#[derive(Debug, PartialEq, Eq, ThisError)]
	#[error("Connection refused by {0}.")]
	pub struct RefusedError(pub String);

	/// Fake connection handle carrying the DSN it was opened with.
	#[derive(Clone, Debug, PartialEq, Eq)]
	pub struct FakeConnection {
		/// DSN presented to the opener.
		pub dsn: String,
	}

	/// Opener that records every DSN it receives and can be told to refuse connections.
	#[derive(Debug, Default)]
	pub struct RecordingOpener {
		seen: Mutex<Vec<String>>,
		refuse: Mutex<usize>,
	}
	impl RecordingOpener {
		/// Makes the next `count` opens fail.
		pub fn refuse_next(&self, count: usize) {
			*self.refuse.lock() += count;
		}

		/// DSNs received so far, in call order.
		pub fn seen(&self) -> Vec<String> {
			self.seen.lock().clone()
		}
	}
	impl Opener for RecordingOpener {
		type Connection = FakeConnection;
		type Error = RefusedError;

		fn open<'a>(&'a self, dsn: &'a str) -> OpenFuture<'a, Self::Connection, Self::Error> {
			Box::pin(async move {
				self.seen.lock().push(dsn.to_owned());

				let mut refuse = self.refuse.lock();

				if *refuse > 0 {
					*refuse -= 1;

					return Err(RefusedError(dsn.to_owned()));
				}

				Ok(FakeConnection { dsn: dsn.to_owned() })
			})
		}
	}
}

mod _prelude {
	pub use std::{
		collections::BTreeMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::Mutex;
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};

	pub use crate::error::BoxError;
}

pub use url;
#[cfg(test)] use color_eyre as _;
