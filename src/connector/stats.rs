// std
use std::sync::atomic::{AtomicU64, Ordering};
// self
use crate::_prelude::*;

/// Thread-safe counters for renewal decisions and open failures.
#[derive(Debug, Default)]
pub struct RenewalMetrics {
	builds: AtomicU64,
	reuses: AtomicU64,
	build_failures: AtomicU64,
	open_failures: AtomicU64,
	last_built_at: Mutex<Option<OffsetDateTime>>,
}
impl RenewalMetrics {
	/// Returns the number of connection strings minted.
	pub fn builds(&self) -> u64 {
		self.builds.load(Ordering::Relaxed)
	}

	/// Returns the number of opens served from the cached connection string.
	pub fn reuses(&self) -> u64 {
		self.reuses.load(Ordering::Relaxed)
	}

	/// Returns the number of failed connection-string builds.
	pub fn build_failures(&self) -> u64 {
		self.build_failures.load(Ordering::Relaxed)
	}

	/// Returns the number of inner opener failures.
	pub fn open_failures(&self) -> u64 {
		self.open_failures.load(Ordering::Relaxed)
	}

	/// Instant the most recent successful build was stamped with.
	pub fn last_built_at(&self) -> Option<OffsetDateTime> {
		*self.last_built_at.lock()
	}

	pub(crate) fn record_build(&self, at: OffsetDateTime) {
		self.builds.fetch_add(1, Ordering::Relaxed);
		*self.last_built_at.lock() = Some(at);
	}

	pub(crate) fn record_reuse(&self) {
		self.reuses.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_build_failure(&self) {
		self.build_failures.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_open_failure(&self) {
		self.open_failures.fetch_add(1, Ordering::Relaxed);
	}
}
