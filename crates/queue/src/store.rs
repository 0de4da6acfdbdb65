use std::collections::VecDeque;

use parking_lot::Mutex;
use tokio::sync::Notify;

use crate::message::{Content, QueueItem};

/// Result of handing a message to the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueOutcome {
	/// Appended behind everything already queued.
	Enqueued,
	/// Inserted ahead of every non-promoted message.
	Promoted,
	/// Dropped because an identical message is already queued.
	Discarded,
}

/// Pending messages, ordered by promotion class then arrival.
///
/// Enqueue and dequeue each run as one critical section under the same lock.
/// The "item available" signal is a [`Notify`] permit backed by the queue's
/// emptiness, so [`MessageStore::wait_available`] never misses an insert.
pub(crate) struct MessageStore<C> {
	queue: Mutex<VecDeque<QueueItem<C>>>,
	available: Notify,
	discard_duplicates: bool,
}

impl<C: Content> MessageStore<C> {
	pub(crate) fn new(discard_duplicates: bool) -> Self {
		Self {
			queue: Mutex::new(VecDeque::new()),
			available: Notify::new(),
			discard_duplicates,
		}
	}

	/// Inserts one message honoring de-duplication and promotion.
	pub(crate) fn enqueue(&self, item: QueueItem<C>) -> EnqueueOutcome {
		let mut queue = self.queue.lock();

		if self.discard_duplicates && !item.suppresses_dedup() && queue.iter().any(|queued| queued.is_duplicate_of(&item)) {
			return EnqueueOutcome::Discarded;
		}

		let outcome = if item.is_promoted() {
			let at = queue.iter().position(|queued| !queued.is_promoted()).unwrap_or(queue.len());
			queue.insert(at, item);
			EnqueueOutcome::Promoted
		} else {
			queue.push_back(item);
			EnqueueOutcome::Enqueued
		};
		drop(queue);

		self.available.notify_one();
		outcome
	}

	/// Removes and returns the head message.
	pub(crate) fn dequeue_head(&self) -> Option<QueueItem<C>> {
		let mut queue = self.queue.lock();
		let item = queue.pop_front();
		let remaining = queue.len();
		drop(queue);

		if remaining > 0 {
			self.available.notify_one();
		}
		item
	}

	/// Resolves once at least one message is queued.
	pub(crate) async fn wait_available(&self) {
		loop {
			// Register before checking to avoid a lost wakeup between the
			// emptiness check and the await.
			let notified = self.available.notified();
			if !self.queue.lock().is_empty() {
				return;
			}
			notified.await;
		}
	}

	/// Drops every pending message, returning how many were removed.
	pub(crate) fn clear(&self) -> usize {
		let mut queue = self.queue.lock();
		let removed = queue.len();
		queue.clear();
		removed
	}

	pub(crate) fn len(&self) -> usize {
		self.queue.lock().len()
	}

	#[cfg(test)]
	fn contents(&self) -> Vec<C> {
		self.queue.lock().iter().map(|item| item.content().clone()).collect()
	}
}
