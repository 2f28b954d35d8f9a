use std::sync::mpsc::{channel, Receiver, Sender};

/// Why a layout pass is needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutReason {
    /// A node's responses were expanded or collapsed.
    ResponsesToggled,
    /// A post's rendered height changed (image loaded, answer form opened).
    ContentResized,
    /// The tree was rebuilt after a refetch or a new reply.
    TreeRebuilt,
    /// The posts filter changed what is displayed.
    FilterChanged,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutChange {
    pub reason: LayoutReason,
    /// The post that caused the change, when there is a single one.
    pub post: Option<String>,
}

impl LayoutChange {
    pub fn new(reason: LayoutReason, post: Option<String>) -> Self {
        Self { reason, post }
    }
}

/// Broadcast channel for "layout changed" notifications.
///
/// The view controller emits on every mutation that moves content; whoever
/// repositions overlays subscribes and recomputes on receipt. Subscribers
/// whose receiver was dropped are pruned on the next emit.
#[derive(Default)]
pub struct LayoutBus {
    subscribers: Vec<Sender<LayoutChange>>,
}

impl LayoutBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self) -> Receiver<LayoutChange> {
        let (tx, rx) = channel();
        self.subscribers.push(tx);
        rx
    }

    pub fn emit(&mut self, change: LayoutChange) {
        self.subscribers.retain(|tx| tx.send(change.clone()).is_ok());
    }
}
