// self
use crate::{_prelude::*, obs::FlowKind};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedFlow<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedFlow<F> = F;

/// A span builder used by pipeline flows.
#[derive(Clone, Debug)]
pub struct FlowSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl FlowSpan {
	/// Creates a new span tagged with the provided flow kind + stage.
	pub fn new(kind: FlowKind, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("simplenote_client.flow", flow = kind.as_str(), stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, stage);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedFlow<Fut>
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

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[cfg(feature = "tracing")]
	#[tokio::test]
	async fn instrument_wraps_future() {
		let span = FlowSpan::new(FlowKind::Refresh, "instrument_wraps_future");
		let value = span.instrument(async { 42 }).await;

		assert_eq!(value, 42);
	}

	#[test]
	fn flow_span_constructs_without_tracing() {
		let _span = FlowSpan::new(FlowKind::Request, "test");
	}
}
