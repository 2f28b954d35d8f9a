use std::collections::HashMap;

use crate::models::{Extract, Post};
use crate::view::{PostRow, RowKind};

/// Vertical gap kept between two stacked overlays.
pub const NUGGET_SPACER: f32 = 100.0;

/// Measures where a post sits in whatever medium renders it. Injected so the
/// position engine stays independent of the renderer.
pub trait AnchorMetrics {
    /// Top offset of the post the overlay annotates; None while unmounted.
    fn anchor_top(&self, post_id: &str) -> Option<f32>;
    /// Rendered height of the overlay itself.
    fn nugget_height(&self, post_id: &str) -> Option<f32>;
}

/// A mounted overlay: one post's important extracts, floating beside it.
#[derive(Debug, Clone, PartialEq)]
pub struct NuggetOverlay {
    pub post_id: String,
    /// Row path of the anchor post; defines document order.
    pub row_path: Vec<usize>,
    pub extracts: Vec<Extract>,
}

/// Where an overlay ended up after a layout pass.
#[derive(Debug, Clone, PartialEq)]
pub struct NuggetPosition {
    pub post_id: String,
    /// The anchor's measured top, when the anchor was mounted.
    pub anchor_top: Option<f32>,
    /// Offset forced by the previous overlay; None keeps natural alignment.
    pub forced_top: Option<f32>,
}

impl NuggetPosition {
    pub fn resolved_top(&self) -> Option<f32> {
        self.forced_top.or(self.anchor_top)
    }
}

/// Ordered collection of mounted overlays for one page view.
///
/// Owned by the page state and passed by reference wherever overlays mount
/// and unmount; there is no global registry.
#[derive(Debug, Default)]
pub struct NuggetRegistry {
    overlays: Vec<NuggetOverlay>,
}

impl NuggetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn overlays(&self) -> &[NuggetOverlay] {
        &self.overlays
    }

    /// Mounts an overlay, keeping the collection in document order. Mounting
    /// the same post again replaces its previous registration.
    pub fn mount(&mut self, overlay: NuggetOverlay) {
        self.release(&overlay.post_id);
        let at = self
            .overlays
            .partition_point(|existing| existing.row_path <= overlay.row_path);
        self.overlays.insert(at, overlay);
    }

    /// Unmounts the overlay bound to `post_id`, if any.
    pub fn release(&mut self, post_id: &str) {
        self.overlays.retain(|o| o.post_id != post_id);
    }

    /// Reconciles the registry against a fresh render plan: fully rendered
    /// posts with at least one important extract stay mounted, everything
    /// else is released.
    pub fn sync_rows(&mut self, rows: &[PostRow], posts_by_id: &HashMap<String, &Post>) {
        self.overlays.clear();
        for row in rows {
            if row.kind != RowKind::Full {
                continue;
            }
            let Some(post) = posts_by_id.get(&row.post_id) else {
                continue;
            };
            let important = post.important_extracts();
            if important.is_empty() {
                continue;
            }
            // rows arrive in document order already
            self.overlays.push(NuggetOverlay {
                post_id: row.post_id.clone(),
                row_path: row.path.clone(),
                extracts: important,
            });
        }
    }

    /// One greedy pass over the overlays in document order.
    ///
    /// Each overlay wants its anchor's top. If the previously placed
    /// overlay's bottom edge (top + height + [`NUGGET_SPACER`]) reaches past
    /// that, the overlay is pushed down to start exactly at the bottom edge.
    /// Only consecutive pairs are checked; repeated calls with unchanged
    /// metrics produce identical output. An overlay whose anchor is not
    /// mounted stays unplaced and its successor relaxes against the last
    /// overlay that was actually placed.
    pub fn update_positions(&self, metrics: &dyn AnchorMetrics) -> Vec<NuggetPosition> {
        let mut positions = Vec::with_capacity(self.overlays.len());
        let mut previous_bottom: Option<f32> = None;

        for overlay in &self.overlays {
            let anchor_top = metrics.anchor_top(&overlay.post_id);
            let Some(candidate) = anchor_top else {
                positions.push(NuggetPosition {
                    post_id: overlay.post_id.clone(),
                    anchor_top: None,
                    forced_top: None,
                });
                continue;
            };

            let forced_top = match previous_bottom {
                Some(bottom) if bottom > candidate => Some(bottom),
                _ => None,
            };
            let top = forced_top.unwrap_or(candidate);
            let height = metrics.nugget_height(&overlay.post_id).unwrap_or(0.0);
            previous_bottom = Some(top + height + NUGGET_SPACER);

            positions.push(NuggetPosition {
                post_id: overlay.post_id.clone(),
                anchor_top,
                forced_top,
            });
        }

        positions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    use crate::models::test_post as post;
    use crate::models::Extract;
    use crate::view::ThreadView;

    #[derive(Default)]
    struct FakeMetrics {
        tops: HashMap<String, f32>,
        heights: HashMap<String, f32>,
    }

    impl FakeMetrics {
        fn with(entries: &[(&str, f32, f32)]) -> Self {
            let mut metrics = Self::default();
            for (id, top, height) in entries {
                metrics.tops.insert(id.to_string(), *top);
                metrics.heights.insert(id.to_string(), *height);
            }
            metrics
        }
    }

    impl AnchorMetrics for FakeMetrics {
        fn anchor_top(&self, post_id: &str) -> Option<f32> {
            self.tops.get(post_id).copied()
        }

        fn nugget_height(&self, post_id: &str) -> Option<f32> {
            self.heights.get(post_id).copied()
        }
    }

    fn overlay(post_id: &str, row_path: &[usize]) -> NuggetOverlay {
        NuggetOverlay {
            post_id: post_id.to_string(),
            row_path: row_path.to_vec(),
            extracts: vec![Extract {
                id: format!("{post_id}-extract"),
                body: "noted".into(),
                important: true,
            }],
        }
    }

    #[test]
    fn crowded_overlay_is_pushed_to_the_previous_bottom_edge() {
        let mut registry = NuggetRegistry::new();
        registry.mount(overlay("a", &[0]));
        registry.mount(overlay("b", &[1]));

        // previous bottom = 400 + 150 + 100 = 650 > 500
        let metrics = FakeMetrics::with(&[("a", 400.0, 150.0), ("b", 500.0, 80.0)]);
        let positions = registry.update_positions(&metrics);

        assert_eq!(positions[0].forced_top, None);
        assert_eq!(positions[0].resolved_top(), Some(400.0));
        assert_eq!(positions[1].forced_top, Some(650.0));
        assert_eq!(positions[1].resolved_top(), Some(650.0));
    }

    #[test]
    fn distant_overlay_keeps_its_natural_alignment() {
        let mut registry = NuggetRegistry::new();
        registry.mount(overlay("a", &[0]));
        registry.mount(overlay("b", &[1]));

        let metrics = FakeMetrics::with(&[("a", 100.0, 50.0), ("b", 900.0, 80.0)]);
        let positions = registry.update_positions(&metrics);

        assert_eq!(positions[1].forced_top, None);
        assert_eq!(positions[1].resolved_top(), Some(900.0));
    }

    #[test]
    fn forced_overlays_chain_through_a_crowded_run() {
        let mut registry = NuggetRegistry::new();
        registry.mount(overlay("a", &[0]));
        registry.mount(overlay("b", &[1]));
        registry.mount(overlay("c", &[2]));

        let metrics = FakeMetrics::with(&[
            ("a", 0.0, 50.0),
            ("b", 60.0, 50.0),
            ("c", 120.0, 50.0),
        ]);
        let positions = registry.update_positions(&metrics);

        // a bottoms out at 150, b is forced there, b bottoms out at 300
        assert_eq!(positions[1].forced_top, Some(150.0));
        assert_eq!(positions[2].forced_top, Some(300.0));
    }

    #[test]
    fn unmounted_anchor_is_skipped_in_the_relaxation_chain() {
        let mut registry = NuggetRegistry::new();
        registry.mount(overlay("a", &[0]));
        registry.mount(overlay("gone", &[1]));
        registry.mount(overlay("c", &[2]));

        let metrics = FakeMetrics::with(&[("a", 400.0, 150.0), ("c", 500.0, 80.0)]);
        let positions = registry.update_positions(&metrics);

        assert_eq!(positions[1].resolved_top(), None);
        // c relaxes against a, not against the unplaced overlay
        assert_eq!(positions[2].forced_top, Some(650.0));
    }

    #[test]
    fn repeated_passes_with_unchanged_metrics_are_idempotent() {
        let mut registry = NuggetRegistry::new();
        registry.mount(overlay("a", &[0]));
        registry.mount(overlay("b", &[1]));

        let metrics = FakeMetrics::with(&[("a", 400.0, 150.0), ("b", 500.0, 80.0)]);
        let first = registry.update_positions(&metrics);
        let second = registry.update_positions(&metrics);
        assert_eq!(first, second);
    }

    #[test]
    fn mount_keeps_document_order_and_replaces_duplicates() {
        let mut registry = NuggetRegistry::new();
        registry.mount(overlay("c", &[2]));
        registry.mount(overlay("a", &[0]));
        registry.mount(overlay("b", &[1]));

        let order: Vec<&str> = registry.overlays().iter().map(|o| o.post_id.as_str()).collect();
        assert_eq!(order, ["a", "b", "c"]);

        let mut replacement = overlay("b", &[1]);
        replacement.extracts.clear();
        registry.mount(replacement);
        assert_eq!(registry.overlays().len(), 3);
        assert!(registry.overlays()[1].extracts.is_empty());

        registry.release("a");
        assert_eq!(registry.overlays().len(), 2);
    }

    #[test]
    fn sync_rows_mounts_only_full_rows_with_important_extracts() {
        let mut posts = vec![post("a", None), post("b", Some("a")), post("c", None)];
        posts[0].extracts.push(Extract {
            id: "e1".into(),
            body: "key point".into(),
            important: true,
        });
        posts[1].extracts.push(Extract {
            id: "e2".into(),
            body: "folded away".into(),
            important: true,
        });
        posts[2].extracts.push(Extract {
            id: "e3".into(),
            body: "not important".into(),
            important: false,
        });

        // default summary display folds b behind a
        let view = ThreadView::from_posts(&posts, "en");
        let rows = view.rows();
        let by_id: HashMap<String, &crate::models::Post> =
            posts.iter().map(|p| (p.id.clone(), p)).collect();

        let mut registry = NuggetRegistry::new();
        registry.sync_rows(&rows, &by_id);

        let mounted: Vec<&str> = registry.overlays().iter().map(|o| o.post_id.as_str()).collect();
        assert_eq!(mounted, ["a"]);
    }
}
