mod messages;
mod spawners;
mod state;
mod tasks;

pub use messages::{process_messages, AppMessage};
pub use state::{IdeaPageState, IdeaSummary};

use std::collections::HashMap;
use std::sync::mpsc::{channel, Receiver, Sender};

use plenum_core::layout::LayoutChange;
use plenum_core::models::Post;
use plenum_core::{AnchorMetrics, NuggetPosition};

use crate::api::ApiClient;

/// Page container for one idea's discussion thread.
///
/// Owns all state; background fetches run on spawned threads and report back
/// through the message channel, drained by [`process_messages`] in the update
/// loop. The layout bus is drained in the same loop, so overlay recomputation
/// is serialized with state mutation.
pub struct IdeaPage {
    pub api: ApiClient,
    pub idea_id: String,
    pub state: IdeaPageState,
    pub tx: Sender<AppMessage>,
    pub(crate) rx: Receiver<AppMessage>,
    layout_rx: Receiver<LayoutChange>,
}

impl IdeaPage {
    pub fn new(api: ApiClient, idea_id: impl Into<String>, content_locale: &str) -> Self {
        let (tx, rx) = channel();
        let mut state = IdeaPageState::new(content_locale);
        let layout_rx = state.thread_view.subscribe_layout();
        Self {
            api,
            idea_id: idea_id.into(),
            state,
            tx,
            rx,
            layout_rx,
        }
    }

    /// The expansion dispatch the view components call into.
    pub fn toggle_item(&mut self, post_id: &str) {
        self.state.thread_view.toggle_responses(post_id);
    }

    /// Drains pending layout-change events; when any arrived, reconciles the
    /// overlay registry against the current render plan and recomputes
    /// positions. Returns None when the layout did not change.
    pub fn pump_layout(&mut self, metrics: &dyn AnchorMetrics) -> Option<Vec<NuggetPosition>> {
        let mut changed = false;
        while let Ok(change) = self.layout_rx.try_recv() {
            log::debug!("layout changed: {:?}", change.reason);
            changed = true;
        }
        if !changed {
            return None;
        }

        let rows = self.state.thread_view.rows();
        let by_id: HashMap<String, &Post> = self
            .state
            .posts
            .iter()
            .map(|p| (p.id.clone(), p))
            .collect();
        self.state.nuggets.sync_rows(&rows, &by_id);
        Some(self.state.nuggets.update_positions(metrics))
    }
}
