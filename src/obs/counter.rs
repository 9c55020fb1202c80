// self
use crate::obs::{OpenOutcome, RenewalOutcome};

/// Records an open outcome via the global metrics recorder (when enabled).
pub fn record_open_outcome(outcome: OpenOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!("rds_iam_connector_open_total", "outcome" => outcome.as_str())
			.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = outcome;
	}
}

/// Records a renewal decision via the global metrics recorder (when enabled).
pub fn record_renewal_outcome(outcome: RenewalOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!("rds_iam_connector_renewal_total", "renewal" => outcome.as_str())
			.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = outcome;
	}
}
