use std::collections::HashMap;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

use super::controller::FetchEvent;

struct Pending {
	seq: u64,
	value: String,
	task: JoinHandle<()>,
}

/// Trailing-edge debounce with one timer task per filter key.
///
/// Scheduling a key again aborts its previous timer. Each fire carries a
/// sequence number so a timer that raced its abort is recognised as stale.
pub(crate) struct Debouncer {
	delay: Duration,
	next_seq: u64,
	pending: HashMap<String, Pending>,
	tx: UnboundedSender<FetchEvent>,
}

impl Debouncer {
	pub(crate) fn new(delay: Duration, tx: UnboundedSender<FetchEvent>) -> Self {
		Self {
			delay,
			next_seq: 0,
			pending: HashMap::new(),
			tx,
		}
	}

	pub(crate) fn schedule(&mut self, runtime: &Handle, key: &str, value: String) {
		if let Some(previous) = self.pending.remove(key) {
			previous.task.abort();
		}
		self.next_seq += 1;
		let seq = self.next_seq;
		let delay = self.delay;
		let tx = self.tx.clone();
		let task_key = key.to_string();
		let task_value = value.clone();
		let task = runtime.spawn(async move {
			tokio::time::sleep(delay).await;
			let _ = tx.send(FetchEvent::Debounced {
				key: task_key,
				seq,
				value: task_value,
			});
		});
		self.pending.insert(key.to_string(), Pending { seq, value, task });
	}

	/// Consume a fire, returning whether it is the latest for its key.
	pub(crate) fn complete(&mut self, key: &str, seq: u64) -> bool {
		match self.pending.get(key) {
			Some(pending) if pending.seq == seq => {
				self.pending.remove(key);
				true
			}
			_ => false,
		}
	}

	pub(crate) fn cancel(&mut self, key: &str) {
		if let Some(pending) = self.pending.remove(key) {
			pending.task.abort();
		}
	}

	/// Abort every timer and hand back the values they would have fired.
	///
	/// A fire that already raced out is rejected by [`Debouncer::complete`].
	pub(crate) fn flush(&mut self) -> Vec<(String, String)> {
		let mut flushed: Vec<_> = self
			.pending
			.drain()
			.map(|(key, pending)| {
				pending.task.abort();
				(pending.seq, key, pending.value)
			})
			.collect();
		flushed.sort_by_key(|(seq, ..)| *seq);
		flushed.into_iter().map(|(_, key, value)| (key, value)).collect()
	}

	pub(crate) fn cancel_all(&mut self) {
		for (_, pending) in self.pending.drain() {
			pending.task.abort();
		}
	}

	pub(crate) fn has_pending(&self) -> bool {
		!self.pending.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use tokio::sync::mpsc;

	use super::*;

	#[tokio::test(start_paused = true)]
	async fn only_the_last_keystroke_fires() {
		let (tx, mut rx) = mpsc::unbounded_channel();
		let mut debouncer = Debouncer::new(Duration::from_millis(500), tx);
		let runtime = Handle::current();

		debouncer.schedule(&runtime, "filename", "r".into());
		tokio::time::sleep(Duration::from_millis(300)).await;
		debouncer.schedule(&runtime, "filename", "re".into());
		tokio::time::sleep(Duration::from_millis(300)).await;
		debouncer.schedule(&runtime, "filename", "rep".into());

		let Some(FetchEvent::Debounced { key, seq, value }) = rx.recv().await else {
			panic!("expected a debounced fire");
		};
		assert_eq!(key, "filename");
		assert_eq!(value, "rep");
		assert!(debouncer.complete(&key, seq));
		assert!(!debouncer.has_pending());
		assert!(rx.try_recv().is_err());
	}

	#[tokio::test(start_paused = true)]
	async fn keys_are_debounced_independently() {
		let (tx, mut rx) = mpsc::unbounded_channel();
		let mut debouncer = Debouncer::new(Duration::from_millis(100), tx);
		let runtime = Handle::current();

		debouncer.schedule(&runtime, "filename", "a".into());
		debouncer.schedule(&runtime, "clientId", "b".into());
		let mut fired = Vec::new();
		for _ in 0..2 {
			if let Some(FetchEvent::Debounced { key, seq, .. }) = rx.recv().await {
				assert!(debouncer.complete(&key, seq));
				fired.push(key);
			}
		}
		fired.sort();
		assert_eq!(fired, vec!["clientId", "filename"]);
	}

	#[tokio::test(start_paused = true)]
	async fn superseded_sequence_is_rejected() {
		let (tx, _rx) = mpsc::unbounded_channel();
		let mut debouncer = Debouncer::new(Duration::from_millis(100), tx);
		let runtime = Handle::current();
		debouncer.schedule(&runtime, "filename", "a".into());
		debouncer.schedule(&runtime, "filename", "ab".into());
		assert!(!debouncer.complete("filename", 1));
		assert!(debouncer.complete("filename", 2));
		debouncer.cancel_all();
	}

	#[tokio::test(start_paused = true)]
	async fn flush_hands_back_pending_values_without_firing() {
		let (tx, mut rx) = mpsc::unbounded_channel();
		let mut debouncer = Debouncer::new(Duration::from_millis(500), tx);
		let runtime = Handle::current();
		debouncer.schedule(&runtime, "filename", "inv".into());
		debouncer.schedule(&runtime, "clientId", "acme".into());

		let flushed = debouncer.flush();
		assert_eq!(
			flushed,
			vec![
				("filename".to_string(), "inv".to_string()),
				("clientId".to_string(), "acme".to_string()),
			]
		);
		assert!(!debouncer.has_pending());

		tokio::time::sleep(Duration::from_secs(1)).await;
		assert!(rx.try_recv().is_err());
	}
}
