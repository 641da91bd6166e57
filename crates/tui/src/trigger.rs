/// Fires once each time a scroll position enters the near-end zone.
///
/// The trigger disarms after firing and only re-arms once the viewport
/// leaves the zone again or [`NearEndTrigger::reset`] is called after new
/// data arrives, so a burst of scroll ticks below the threshold produces a
/// single prefetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NearEndTrigger {
	threshold: usize,
	armed: bool,
}

impl NearEndTrigger {
	#[must_use]
	pub fn new(threshold: usize) -> Self {
		Self {
			threshold,
			armed: true,
		}
	}

	pub fn threshold(&self) -> usize {
		self.threshold
	}

	pub fn is_armed(&self) -> bool {
		self.armed
	}

	/// Feed the latest scroll measurements; returns `true` when the caller
	/// should request the next page.
	pub fn observe(&mut self, scroll_height: usize, scroll_top: usize, client_height: usize) -> bool {
		let remaining = scroll_height
			.saturating_sub(scroll_top)
			.saturating_sub(client_height);
		if remaining < self.threshold {
			if self.armed {
				self.armed = false;
				return true;
			}
		} else {
			self.armed = true;
		}
		false
	}

	/// Re-arm after the underlying list changed.
	pub fn reset(&mut self) {
		self.armed = true;
	}
}
