use std::collections::{HashMap, HashSet};
use std::sync::mpsc::Receiver;

use crate::layout::{LayoutBus, LayoutChange, LayoutReason};
use crate::models::{Post, ResolvedContent};
use crate::tree::{build_post_tree, count_descendants, PostNode};

/// How root posts are ordered in the render plan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OrderPolicy {
    #[default]
    ChronologicalFirst,
    ReverseChronologicalFirst,
}

/// How much of each subtree is shown before the user toggles anything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DisplayPolicy {
    /// Every node starts expanded; the whole thread is visible.
    Full,
    /// Every node starts collapsed; replies fold behind summary rows.
    #[default]
    Summary,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostsFilter {
    pub order: OrderPolicy,
    pub display: DisplayPolicy,
    /// Restrict roots to subtrees this author contributed to.
    pub only_author: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowKind {
    Full,
    /// A collapsed subtree summarized in one line; `hidden` counts the posts
    /// behind it, the folded post included.
    Folded { hidden: usize },
}

/// One entry of the render plan produced by [`ThreadView::rows`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostRow {
    pub post_id: String,
    pub depth: usize,
    /// Child indexes from the displayed root down to this row.
    pub path: Vec<usize>,
    pub subject: String,
    pub body: String,
    /// Locale the subject/body resolved in.
    pub locale: String,
    pub kind: RowKind,
    /// Direct responses to this post.
    pub responses: usize,
}

/// Stateful controller over a reply tree: per-node expansion, folding,
/// locale-aware content selection, and a posts filter.
///
/// Expansion state lives only in memory and survives tree replacement, so a
/// refetch keeps already-open branches open. Every mutation that moves
/// rendered content emits a [`LayoutChange`] for overlay repositioning.
pub struct ThreadView {
    nodes: Vec<PostNode>,
    expanded: HashMap<String, bool>,
    eager: HashSet<String>,
    content_locale: String,
    locale_overrides: HashMap<String, String>,
    filter: PostsFilter,
    bus: LayoutBus,
}

impl ThreadView {
    pub fn new(content_locale: impl Into<String>) -> Self {
        Self {
            nodes: Vec::new(),
            expanded: HashMap::new(),
            eager: HashSet::new(),
            content_locale: content_locale.into(),
            locale_overrides: HashMap::new(),
            filter: PostsFilter::default(),
            bus: LayoutBus::new(),
        }
    }

    pub fn from_posts(posts: &[Post], content_locale: impl Into<String>) -> Self {
        let mut view = Self::new(content_locale);
        view.nodes = build_post_tree(posts);
        view
    }

    pub fn nodes(&self) -> &[PostNode] {
        &self.nodes
    }

    pub fn content_locale(&self) -> &str {
        &self.content_locale
    }

    pub fn filter(&self) -> &PostsFilter {
        &self.filter
    }

    pub fn subscribe_layout(&mut self) -> Receiver<LayoutChange> {
        self.bus.subscribe()
    }

    /// Replaces the tree from a fresh flat list. Expansion state is kept so
    /// branches the user opened stay open across a refetch.
    pub fn set_posts(&mut self, posts: &[Post]) {
        self.nodes = build_post_tree(posts);
        self.bus
            .emit(LayoutChange::new(LayoutReason::TreeRebuilt, None));
    }

    /// Whether a node's responses are currently shown.
    pub fn is_expanded(&self, post_id: &str) -> bool {
        if let Some(&explicit) = self.expanded.get(post_id) {
            return explicit;
        }
        if self.eager.contains(post_id) {
            return true;
        }
        matches!(self.filter.display, DisplayPolicy::Full)
    }

    /// Flips a node between collapsed and expanded. Always reversible;
    /// toggling twice restores the previous render plan.
    pub fn toggle_responses(&mut self, post_id: &str) {
        let next = !self.is_expanded(post_id);
        self.expanded.insert(post_id.to_string(), next);
        self.bus.emit(LayoutChange::new(
            LayoutReason::ResponsesToggled,
            Some(post_id.to_string()),
        ));
    }

    /// Eagerly expands every ancestor of `post_id` so a deep-linked post is
    /// visible. Returns false when the post is not in the tree.
    pub fn reveal(&mut self, post_id: &str) -> bool {
        let mut chain = Vec::new();
        if !ancestor_chain(&self.nodes, post_id, &mut chain) {
            return false;
        }
        self.eager.extend(chain);
        self.bus.emit(LayoutChange::new(
            LayoutReason::ResponsesToggled,
            Some(post_id.to_string()),
        ));
        true
    }

    /// Signals that a post's rendered height changed without any state
    /// transition here (an image finished loading, a form opened).
    pub fn content_resized(&mut self, post_id: &str) {
        self.bus.emit(LayoutChange::new(
            LayoutReason::ContentResized,
            Some(post_id.to_string()),
        ));
    }

    pub fn set_content_locale(&mut self, locale: impl Into<String>) {
        self.content_locale = locale.into();
        self.bus
            .emit(LayoutChange::new(LayoutReason::ContentResized, None));
    }

    /// Per-post locale override; takes precedence over the view-wide locale.
    pub fn set_content_locale_for(&mut self, post_id: &str, locale: impl Into<String>) {
        self.locale_overrides
            .insert(post_id.to_string(), locale.into());
        self.bus.emit(LayoutChange::new(
            LayoutReason::ContentResized,
            Some(post_id.to_string()),
        ));
    }

    pub fn clear_content_locale_for(&mut self, post_id: &str) {
        if self.locale_overrides.remove(post_id).is_some() {
            self.bus.emit(LayoutChange::new(
                LayoutReason::ContentResized,
                Some(post_id.to_string()),
            ));
        }
    }

    pub fn set_filter(&mut self, filter: PostsFilter) {
        self.filter = filter;
        self.bus
            .emit(LayoutChange::new(LayoutReason::FilterChanged, None));
    }

    /// Restores the default filter and forgets explicit toggles.
    pub fn reset_filter(&mut self) {
        self.filter = PostsFilter::default();
        self.expanded.clear();
        self.bus
            .emit(LayoutChange::new(LayoutReason::FilterChanged, None));
    }

    /// The render plan: one row per visible post, in display order.
    ///
    /// Children of an expanded node recurse in full; children of a collapsed
    /// node each become a single folded row summarizing their subtree.
    pub fn rows(&self) -> Vec<PostRow> {
        let mut roots: Vec<&PostNode> = self.nodes.iter().collect();
        if let Some(author) = &self.filter.only_author {
            roots.retain(|root| subtree_involves(root, author));
        }
        match self.filter.order {
            OrderPolicy::ChronologicalFirst => {
                roots.sort_by(|a, b| a.post.creation_date.cmp(&b.post.creation_date));
            }
            OrderPolicy::ReverseChronologicalFirst => {
                roots.sort_by(|a, b| b.post.creation_date.cmp(&a.post.creation_date));
            }
        }

        let mut out = Vec::new();
        let mut path = Vec::new();
        for (index, root) in roots.iter().enumerate() {
            path.push(index);
            self.push_node(root, 0, &mut path, &mut out);
            path.pop();
        }
        out
    }

    fn push_node(
        &self,
        node: &PostNode,
        depth: usize,
        path: &mut Vec<usize>,
        out: &mut Vec<PostRow>,
    ) {
        out.push(self.row_for(node, depth, path, RowKind::Full));
        if self.is_expanded(&node.post.id) {
            for (index, child) in node.children.iter().enumerate() {
                path.push(index);
                self.push_node(child, depth + 1, path, out);
                path.pop();
            }
        } else {
            for (index, child) in node.children.iter().enumerate() {
                path.push(index);
                let hidden = 1 + count_descendants(child);
                out.push(self.row_for(child, depth + 1, path, RowKind::Folded { hidden }));
                path.pop();
            }
        }
    }

    fn row_for(&self, node: &PostNode, depth: usize, path: &[usize], kind: RowKind) -> PostRow {
        let content = self.resolve(&node.post);
        PostRow {
            post_id: node.post.id.clone(),
            depth,
            path: path.to_vec(),
            subject: content.subject.to_string(),
            body: content.body.to_string(),
            locale: content.locale.to_string(),
            kind,
            responses: node.children.len(),
        }
    }

    fn resolve<'a>(&'a self, post: &'a Post) -> ResolvedContent<'a> {
        let requested = self
            .locale_overrides
            .get(&post.id)
            .unwrap_or(&self.content_locale);
        post.content_in(requested)
    }
}

fn subtree_involves(node: &PostNode, user_id: &str) -> bool {
    node.post.creator.user_id == user_id
        || node.children.iter().any(|c| subtree_involves(c, user_id))
}

fn ancestor_chain(nodes: &[PostNode], post_id: &str, chain: &mut Vec<String>) -> bool {
    for node in nodes {
        if node.post.id == post_id {
            return true;
        }
        chain.push(node.post.id.clone());
        if ancestor_chain(&node.children, post_id, chain) {
            return true;
        }
        chain.pop();
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    use crate::models::{test_post as post, TranslatedContent};

    fn sample_view() -> ThreadView {
        let posts = vec![
            post("a", None),
            post("b", Some("a")),
            post("c", None),
            post("d", Some("b")),
        ];
        ThreadView::from_posts(&posts, "en")
    }

    fn visible_ids(view: &ThreadView) -> Vec<String> {
        view.rows().into_iter().map(|r| r.post_id).collect()
    }

    #[test]
    fn summary_display_folds_replies_behind_root_rows() {
        let view = sample_view();
        let rows = view.rows();

        assert_eq!(visible_ids(&view), ["a", "b", "c"]);
        assert_eq!(rows[0].kind, RowKind::Full);
        // b's folded row hides b itself plus d
        assert_eq!(rows[1].kind, RowKind::Folded { hidden: 2 });
        assert_eq!(rows[1].depth, 1);
        assert_eq!(rows[1].path, [0, 0]);
    }

    #[test]
    fn toggling_twice_restores_the_render_plan() {
        let mut view = sample_view();
        let before = view.rows();

        view.toggle_responses("a");
        assert_eq!(visible_ids(&view), ["a", "b", "d", "c"]);

        view.toggle_responses("a");
        assert_eq!(view.rows(), before);
    }

    #[test]
    fn full_display_expands_everything() {
        let mut view = sample_view();
        view.set_filter(PostsFilter {
            display: DisplayPolicy::Full,
            ..PostsFilter::default()
        });
        assert_eq!(visible_ids(&view), ["a", "b", "d", "c"]);

        // an explicit collapse wins over the display policy
        view.toggle_responses("b");
        assert_eq!(visible_ids(&view), ["a", "b", "d", "c"]);
        assert_eq!(
            view.rows()[2].kind,
            RowKind::Folded { hidden: 1 },
            "d folds under the collapsed b"
        );
    }

    #[test]
    fn reveal_expands_the_ancestor_chain_of_a_deep_link() {
        let mut view = sample_view();
        assert!(view.reveal("d"));
        assert_eq!(visible_ids(&view), ["a", "b", "d", "c"]);
        assert!(!view.reveal("nope"));
    }

    #[test]
    fn expansion_survives_tree_replacement() {
        let mut view = sample_view();
        view.toggle_responses("a");

        let refreshed = vec![
            post("a", None),
            post("b", Some("a")),
            post("c", None),
            post("d", Some("b")),
            post("e", Some("a")),
        ];
        view.set_posts(&refreshed);
        assert_eq!(visible_ids(&view), ["a", "b", "d", "e", "c"]);
    }

    #[test]
    fn reverse_chronological_reorders_roots_only() {
        let mut posts = vec![post("a", None), post("b", Some("a")), post("c", None)];
        posts[2].creation_date += chrono::Duration::hours(1);
        let mut view = ThreadView::from_posts(&posts, "en");
        view.set_filter(PostsFilter {
            order: OrderPolicy::ReverseChronologicalFirst,
            ..PostsFilter::default()
        });

        let rows = view.rows();
        assert_eq!(rows[0].post_id, "c");
        assert_eq!(rows[0].path, [0]);
        assert_eq!(rows[1].post_id, "a");
        assert_eq!(rows[2].post_id, "b");
    }

    #[test]
    fn only_author_keeps_roots_their_subtree_involves() {
        let mut posts = vec![post("a", None), post("b", Some("a")), post("c", None)];
        posts[1].creator.user_id = "99".into();
        let mut view = ThreadView::from_posts(&posts, "en");
        view.set_filter(PostsFilter {
            only_author: Some("99".into()),
            ..PostsFilter::default()
        });

        // "a" stays because its reply is by author 99; "c" goes
        assert_eq!(visible_ids(&view), ["a", "b"]);

        view.reset_filter();
        assert_eq!(visible_ids(&view), ["a", "b", "c"]);
    }

    #[test]
    fn locale_override_beats_the_view_locale() {
        let mut posts = vec![post("a", None)];
        posts[0].translations.insert(
            "fr".into(),
            TranslatedContent {
                subject: "Sujet".into(),
                body: "Corps".into(),
            },
        );
        let mut view = ThreadView::from_posts(&posts, "en");

        // no "en" translation, original locale is "en", raw body passes through
        assert_eq!(view.rows()[0].body, "Body a");
        assert_eq!(view.rows()[0].locale, "en");

        view.set_content_locale_for("a", "fr");
        assert_eq!(view.rows()[0].body, "Corps");
        assert_eq!(view.rows()[0].locale, "fr");

        view.clear_content_locale_for("a");
        assert_eq!(view.rows()[0].body, "Body a");
    }

    #[test]
    fn mutations_emit_layout_changes() {
        let mut view = sample_view();
        let rx = view.subscribe_layout();

        view.toggle_responses("a");
        view.set_posts(&[post("a", None)]);
        view.set_filter(PostsFilter::default());
        view.content_resized("a");

        let reasons: Vec<LayoutReason> = rx.try_iter().map(|c| c.reason).collect();
        assert_eq!(
            reasons,
            [
                LayoutReason::ResponsesToggled,
                LayoutReason::TreeRebuilt,
                LayoutReason::FilterChanged,
                LayoutReason::ContentResized,
            ]
        );
    }
}
