//! Optional observability helpers for connector opens.
//!
//! # Feature Flags
//!
//! - Enable `tracing` (default) to emit structured spans named `rds_iam_connector.open` with the
//!   `endpoint` and `name` fields, plus renewal events.
//! - Enable `metrics` to increment the `rds_iam_connector_open_total` counter labeled by
//!   `outcome`, and `rds_iam_connector_renewal_total` labeled by `renewal`.

mod counter;
mod span;

pub use counter::*;
pub use span::*;

// self
use crate::_prelude::*;

/// Outcome labels recorded for each open.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpenOutcome {
	/// Entry to [`crate::connector::Connector::open`].
	Attempt,
	/// A connection was returned.
	Success,
	/// An error was propagated back to the caller.
	Failure,
}
impl OpenOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OpenOutcome::Attempt => "attempt",
			OpenOutcome::Success => "success",
			OpenOutcome::Failure => "failure",
		}
	}
}
impl Display for OpenOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// What the renewal gate decided for a single open.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RenewalOutcome {
	/// The cached connection string was still fresh.
	Reused,
	/// A new connection string was minted.
	Built,
	/// Minting failed; the cache was left as it was.
	Failed,
}
impl RenewalOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			RenewalOutcome::Reused => "reused",
			RenewalOutcome::Built => "built",
			RenewalOutcome::Failed => "failed",
		}
	}
}
impl Display for RenewalOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
