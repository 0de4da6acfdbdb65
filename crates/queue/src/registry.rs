use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::RwLock;
use tokio_util::sync::CancellationToken;

use crate::action::{ActionOutcome, ActionSlot};
use crate::error::ActionFault;
use crate::hover::HoverGuard;
use crate::message::{ActionKind, Content};
use crate::surface::{Surface, SurfaceId, on_ui};

/// Engine-side state for one attached surface.
///
/// The surface itself sits behind an emptiable slot: detaching takes it out,
/// and every engine call resolves the slot first, so a detached surface is
/// never reached again through this entry.
pub(crate) struct SurfaceEntry<C> {
	id: SurfaceId,
	surface: RwLock<Option<Arc<dyn Surface<C>>>>,
	pub(crate) hover: Arc<HoverGuard>,
	pub(crate) actions: ActionSlot,
	detached: CancellationToken,
}

impl<C: Content> SurfaceEntry<C> {
	pub(crate) fn id(&self) -> SurfaceId {
		self.id
	}

	/// Resolves the surface if it is still attached.
	pub(crate) fn surface(&self) -> Option<Arc<dyn Surface<C>>> {
		self.surface.read().clone()
	}

	/// Resolves once the surface has been detached.
	pub(crate) async fn detached(&self) {
		self.detached.cancelled().await;
	}

	fn detach(&self) {
		self.surface.write().take();
		self.actions.disarm();
		self.detached.cancel();
	}
}

struct RegistryInner<C> {
	entries: RwLock<Vec<Arc<SurfaceEntry<C>>>>,
	next_id: AtomicU64,
	hover_grace: Duration,
	cancel: CancellationToken,
}

/// The set of surfaces currently attached to one queue.
pub(crate) struct SurfaceRegistry<C> {
	inner: Arc<RegistryInner<C>>,
}

impl<C> Clone for SurfaceRegistry<C> {
	fn clone(&self) -> Self {
		Self {
			inner: Arc::clone(&self.inner),
		}
	}
}

impl<C: Content> SurfaceRegistry<C> {
	pub(crate) fn new(hover_grace: Duration, cancel: CancellationToken) -> Self {
		Self {
			inner: Arc::new(RegistryInner {
				entries: RwLock::new(Vec::new()),
				next_id: AtomicU64::new(0),
				hover_grace,
				cancel,
			}),
		}
	}

	pub(crate) fn attach(&self, surface: Arc<dyn Surface<C>>) -> SurfaceAttachment<C> {
		let id = SurfaceId(self.inner.next_id.fetch_add(1, Ordering::AcqRel).wrapping_add(1));
		let detached = self.inner.cancel.child_token();
		let entry = Arc::new(SurfaceEntry {
			id,
			surface: RwLock::new(Some(surface)),
			hover: Arc::new(HoverGuard::new(self.inner.hover_grace, detached.clone())),
			actions: ActionSlot::default(),
			detached,
		});
		self.inner.entries.write().push(Arc::clone(&entry));
		tracing::debug!(surface = %id, "herald.surface.attach");

		SurfaceAttachment {
			entry,
			registry: Arc::downgrade(&self.inner),
			attached: true,
		}
	}

	/// Copies the attached set so callers iterate without holding the lock.
	pub(crate) fn snapshot(&self) -> Vec<Arc<SurfaceEntry<C>>> {
		self.inner.entries.read().clone()
	}

	/// First attached surface whose own UI context reports it live.
	pub(crate) async fn pick_live(&self) -> Option<Arc<SurfaceEntry<C>>> {
		for entry in self.snapshot() {
			let Some(surface) = entry.surface() else {
				continue;
			};
			if on_ui(surface, |s| s.is_live()).await == Some(true) {
				return Some(entry);
			}
		}
		None
	}

	pub(crate) fn len(&self) -> usize {
		self.inner.entries.read().len()
	}
}

fn detach_from<C: Content>(registry: &Weak<RegistryInner<C>>, entry: &SurfaceEntry<C>) {
	if let Some(inner) = registry.upgrade() {
		inner.entries.write().retain(|attached| attached.id() != entry.id());
	}
	entry.detach();
	tracing::debug!(surface = %entry.id(), "herald.surface.detach");
}

/// Capability returned by [`NotificationQueue::attach`](crate::NotificationQueue::attach).
///
/// Forward the surface's pointer and button notifications here. Dropping the
/// attachment, or calling [`SurfaceAttachment::detach`], removes the surface
/// from the queue; a message it was showing is abandoned.
pub struct SurfaceAttachment<C: Content> {
	entry: Arc<SurfaceEntry<C>>,
	registry: Weak<RegistryInner<C>>,
	attached: bool,
}

impl<C: Content> SurfaceAttachment<C> {
	pub fn id(&self) -> SurfaceId {
		self.entry.id()
	}

	/// The pointer moved onto the surface.
	pub fn pointer_entered(&self) {
		tracing::trace!(surface = %self.entry.id(), "herald.hover.enter");
		self.entry.hover.pointer_entered();
	}

	/// The pointer left the surface. The message may close once the grace window passes.
	pub fn pointer_left(&self) {
		tracing::trace!(surface = %self.entry.id(), "herald.hover.leave");
		self.entry.hover.pointer_left();
	}

	/// Whether the pointer is currently over the surface.
	pub fn is_hovered(&self) -> bool {
		self.entry.hover.is_hovering()
	}

	/// The primary button was clicked. Runs the handler on the calling thread.
	///
	/// A failing handler is logged and returned as [`ActionFault`]; the message
	/// closes either way.
	pub fn primary_clicked(&self) -> Result<ActionOutcome, ActionFault> {
		self.entry.actions.invoke(self.entry.id(), ActionKind::Primary)
	}

	/// The secondary button was clicked. See [`SurfaceAttachment::primary_clicked`].
	pub fn secondary_clicked(&self) -> Result<ActionOutcome, ActionFault> {
		self.entry.actions.invoke(self.entry.id(), ActionKind::Secondary)
	}

	/// Removes the surface from the queue.
	pub fn detach(mut self) {
		self.detach_inner();
	}

	fn detach_inner(&mut self) {
		if std::mem::replace(&mut self.attached, false) {
			detach_from(&self.registry, &self.entry);
		}
	}
}

impl<C: Content> Drop for SurfaceAttachment<C> {
	fn drop(&mut self) {
		self.detach_inner();
	}
}

impl<C: Content> std::fmt::Debug for SurfaceAttachment<C> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("SurfaceAttachment")
			.field("id", &self.entry.id())
			.field("attached", &self.attached)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use std::sync::atomic::AtomicBool;

	use super::*;
	use crate::message::SurfaceMessage;

	struct Toggle {
		live: AtomicBool,
	}

	impl Toggle {
		fn new(live: bool) -> Arc<Self> {
			Arc::new(Self { live: AtomicBool::new(live) })
		}
	}

	impl Surface<String> for Toggle {
		fn is_live(&self) -> bool {
			self.live.load(Ordering::SeqCst)
		}

		fn show(&self, _message: &SurfaceMessage<String>) {}

		fn clear(&self) {}
	}

	fn registry() -> SurfaceRegistry<String> {
		SurfaceRegistry::new(Duration::from_secs(2), CancellationToken::new())
	}

	#[tokio::test]
	async fn picks_first_live_surface() {
		let registry = registry();
		let hidden = Toggle::new(false);
		let shown = Toggle::new(true);
		let a = registry.attach(hidden.clone());
		let b = registry.attach(shown.clone());

		let picked = registry.pick_live().await.expect("one surface is live");
		assert_eq!(picked.id(), b.id());

		hidden.live.store(true, Ordering::SeqCst);
		shown.live.store(false, Ordering::SeqCst);
		assert_eq!(registry.pick_live().await.map(|e| e.id()), Some(a.id()));
	}

	#[tokio::test]
	async fn none_when_nothing_is_live() {
		let registry = registry();
		let _a = registry.attach(Toggle::new(false));
		assert!(registry.pick_live().await.is_none());
	}

	#[tokio::test]
	async fn detach_empties_the_entry() {
		let registry = registry();
		let attachment = registry.attach(Toggle::new(true));
		let entry = registry.pick_live().await.unwrap();
		assert!(entry.surface().is_some());

		attachment.detach();
		assert_eq!(registry.len(), 0);
		assert!(entry.surface().is_none(), "a detached surface must not be reachable");
		tokio::time::timeout(Duration::from_millis(10), entry.detached())
			.await
			.expect("detached signal raised");
		assert!(registry.pick_live().await.is_none());
	}

	#[tokio::test]
	async fn dropping_the_attachment_detaches() {
		let registry = registry();
		{
			let _attachment = registry.attach(Toggle::new(true));
			assert_eq!(registry.len(), 1);
		}
		assert_eq!(registry.len(), 0);
	}

	#[test]
	fn ids_are_unique() {
		let registry = registry();
		let a = registry.attach(Toggle::new(true));
		let b = registry.attach(Toggle::new(true));
		assert_ne!(a.id(), b.id());
	}
}
