//! Optional observability helpers for pipeline flows.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `simplenote_client.flow` with the `flow`
//!   (operation) and `stage` (call site) fields.
//! - Enable `metrics` to increment the `simplenote_client_flow_total` counter for every
//!   attempt/success/failure, labeled by `flow` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Pipeline flow kinds observed by the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowKind {
	/// Credential exchange during login.
	Login,
	/// Account registration.
	Register,
	/// Single-flight credential refresh.
	Refresh,
	/// Protected request execution.
	Request,
}
impl FlowKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowKind::Login => "login",
			FlowKind::Register => "register",
			FlowKind::Refresh => "refresh",
			FlowKind::Request => "request",
		}
	}
}
impl Display for FlowKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowOutcome {
	/// Entry to a pipeline helper.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl FlowOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowOutcome::Attempt => "attempt",
			FlowOutcome::Success => "success",
			FlowOutcome::Failure => "failure",
		}
	}
}
impl Display for FlowOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
