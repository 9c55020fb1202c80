// self
use crate::{_prelude::*, obs::RenewalOutcome};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedOpen<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedOpen<F> = F;

/// A span builder used by connector opens.
#[derive(Clone, Debug)]
pub struct OpenSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl OpenSpan {
	/// Creates a new span tagged with the target endpoint + the caller-supplied name.
	pub fn new(endpoint: &str, name: &str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("rds_iam_connector.open", endpoint, name);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (endpoint, name);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedOpen<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Emits a renewal event; `renew_after` is the watermark in force after the decision.
pub fn trace_renewal(outcome: RenewalOutcome, renew_after: Option<OffsetDateTime>) {
	#[cfg(feature = "tracing")]
	{
		match outcome {
			RenewalOutcome::Failed => tracing::warn!(
				renewal = outcome.as_str(),
				renew_after = ?renew_after,
				"connection string build failed"
			),
			RenewalOutcome::Built | RenewalOutcome::Reused => tracing::debug!(
				renewal = outcome.as_str(),
				renew_after = ?renew_after,
				"renewal gate evaluated"
			),
		}
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (outcome, renew_after);
	}
}
