// std
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters for refresh episodes.
#[derive(Debug, Default)]
pub struct RefreshMetrics {
	exchanges: AtomicU64,
	shared: AtomicU64,
	failures: AtomicU64,
}
impl RefreshMetrics {
	/// Returns the number of refresh exchanges performed on the network.
	pub fn exchanges(&self) -> u64 {
		self.exchanges.load(Ordering::Relaxed)
	}

	/// Returns the number of requests that reused another episode's published outcome instead
	/// of performing an exchange of their own.
	pub fn shared_outcomes(&self) -> u64 {
		self.shared.load(Ordering::Relaxed)
	}

	/// Returns the number of failed refresh episodes.
	pub fn failures(&self) -> u64 {
		self.failures.load(Ordering::Relaxed)
	}

	pub(crate) fn record_exchange(&self) {
		self.exchanges.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_shared(&self) {
		self.shared.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_failure(&self) {
		self.failures.fetch_add(1, Ordering::Relaxed);
	}
}
