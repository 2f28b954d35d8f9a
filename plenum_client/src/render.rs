use std::collections::HashMap;

use plenum_core::models::{sentiment_totals, BodyMimeType, Post, SentimentCounts};
use plenum_core::nuggets::{AnchorMetrics, NuggetOverlay, NuggetPosition};
use plenum_core::view::RowKind;
use plenum_core::SentimentKind;

use crate::app::IdeaPageState;

/// Virtual pixels per rendered text line; offsets reported to the overlay
/// engine are line index times this, emulating DOM measurement.
pub const LINE_HEIGHT: f32 = 16.0;

const INDENT: &str = "    ";

/// Line-based [`AnchorMetrics`] collected while rendering.
#[derive(Debug, Default)]
pub struct LineMetrics {
    tops: HashMap<String, f32>,
    heights: HashMap<String, f32>,
}

impl AnchorMetrics for LineMetrics {
    fn anchor_top(&self, post_id: &str) -> Option<f32> {
        self.tops.get(post_id).copied()
    }

    fn nugget_height(&self, post_id: &str) -> Option<f32> {
        self.heights.get(post_id).copied()
    }
}

pub struct RenderedPage {
    pub text: String,
    pub metrics: LineMetrics,
}

/// Renders the page as indented text, collecting line offsets for the
/// overlay engine along the way.
pub fn render_page(state: &IdeaPageState, width: usize) -> RenderedPage {
    let mut lines: Vec<String> = Vec::new();
    let mut metrics = LineMetrics::default();

    if let Some(idea) = &state.idea {
        lines.push(format!("=== {} ===", idea.title));
        lines.push(format!(
            "{} posts · {} contributors",
            idea.num_posts, idea.num_contributors
        ));
        let totals = sentiment_totals(&state.posts);
        if totals.total() > 0 {
            lines.push(format!("sentiments: {}", format_counts(&totals)));
        }
        lines.push(String::new());
    }

    if state.is_loading {
        lines.push("Loading discussion…".into());
        return finish(lines, metrics);
    }
    if let Some(error) = &state.error {
        lines.push(format!("! could not load the thread: {error}"));
        return finish(lines, metrics);
    }

    let rows = state.thread_view.rows();
    if rows.is_empty() {
        lines.push("No posts in this thread yet.".into());
        return finish(lines, metrics);
    }

    let by_id: HashMap<&str, &Post> = state.posts.iter().map(|p| (p.id.as_str(), p)).collect();
    for row in &rows {
        let indent = INDENT.repeat(row.depth);
        let post = by_id.get(row.post_id.as_str());

        match &row.kind {
            RowKind::Folded { hidden } => {
                lines.push(format!(
                    "{indent}▸ {} ({hidden} hidden)",
                    fold_title(&row.subject)
                ));
            }
            RowKind::Full => {
                metrics
                    .tops
                    .insert(row.post_id.clone(), lines.len() as f32 * LINE_HEIGHT);

                let mut header = format!("{indent}▾ {}", row.subject);
                if let Some(post) = post {
                    header.push_str(&format!(
                        " — {}, {}",
                        post.creator.display_name,
                        post.creation_date.format("%Y-%m-%d %H:%M")
                    ));
                    if post.was_modified() {
                        header.push_str(" (modified)");
                    }
                }
                if row.responses > 0 {
                    header.push_str(&format!(" [{} responses]", row.responses));
                }
                lines.push(header);

                if let Some(post) = post {
                    if post.sentiment_counts.total() > 0 {
                        lines.push(format!(
                            "{indent}  {}",
                            format_counts(&post.sentiment_counts)
                        ));
                    }
                    let mime = post.body_mime_type;
                    for body_line in body_text(&row.body, mime, width).lines() {
                        lines.push(format!("{indent}  {body_line}"));
                    }
                    let important = post.important_extracts();
                    if !important.is_empty() {
                        metrics.heights.insert(
                            row.post_id.clone(),
                            important.len() as f32 * LINE_HEIGHT,
                        );
                    }
                } else {
                    for body_line in row.body.lines() {
                        lines.push(format!("{indent}  {body_line}"));
                    }
                }
                lines.push(String::new());
            }
        }
    }

    finish(lines, metrics)
}

/// The floating-annotation gutter: each mounted overlay with the vertical
/// offset the position engine resolved for it.
pub fn render_nugget_gutter(
    positions: &[NuggetPosition],
    overlays: &[NuggetOverlay],
) -> String {
    if positions.is_empty() {
        return String::new();
    }
    let by_id: HashMap<&str, &NuggetOverlay> =
        overlays.iter().map(|o| (o.post_id.as_str(), o)).collect();

    let mut out = String::from("--- nuggets ---\n");
    for position in positions {
        let place = match position.resolved_top() {
            Some(top) => format!("@{top}px"),
            None => "(unplaced)".into(),
        };
        out.push_str(&format!("{place} post {}\n", position.post_id));
        if let Some(overlay) = by_id.get(position.post_id.as_str()) {
            for extract in &overlay.extracts {
                out.push_str(&format!("  ★ {}\n", extract.body));
            }
        }
    }
    out
}

fn finish(lines: Vec<String>, metrics: LineMetrics) -> RenderedPage {
    let mut text = lines.join("\n");
    text.push('\n');
    RenderedPage { text, metrics }
}

fn body_text(body: &str, mime: BodyMimeType, width: usize) -> String {
    if mime.is_html() {
        html2text::from_read(body.as_bytes(), width)
    } else {
        body.to_string()
    }
}

fn fold_title(subject: &str) -> &str {
    if subject.is_empty() {
        "(no subject)"
    } else {
        subject
    }
}

fn format_counts(counts: &SentimentCounts) -> String {
    SentimentKind::ALL
        .iter()
        .filter(|&&kind| counts.get(kind) > 0)
        .map(|&kind| format!("{} {}", counts.get(kind), kind.label()))
        .collect::<Vec<_>>()
        .join(" · ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    use chrono::TimeZone;
    use chrono::Utc;
    use plenum_core::models::{Author, Extract, PublicationState};

    fn post(id: &str, parent_id: Option<&str>) -> Post {
        Post {
            id: id.to_string(),
            parent_id: parent_id.map(str::to_string),
            subject: format!("Subject {id}"),
            body: format!("Body {id}"),
            body_mime_type: BodyMimeType::TextPlain,
            creation_date: Utc.with_ymd_and_hms(2018, 3, 29, 16, 28, 27).unwrap(),
            modification_date: None,
            creator: Author {
                user_id: "31".into(),
                display_name: "John Doe".into(),
            },
            extracts: Vec::new(),
            sentiment_counts: SentimentCounts::default(),
            publication_state: PublicationState::Published,
            original_locale: "en".into(),
            translations: HashMap::new(),
        }
    }

    fn loaded_state(posts: Vec<Post>) -> IdeaPageState {
        let mut state = IdeaPageState::new("en");
        state.thread_view.set_posts(&posts);
        state.posts = posts;
        state
    }

    #[test]
    fn renders_full_and_folded_rows() {
        let state = loaded_state(vec![
            post("a", None),
            post("b", Some("a")),
            post("c", Some("b")),
        ]);
        let rendered = render_page(&state, 80);

        assert!(rendered.text.contains("▾ Subject a — John Doe"));
        // summary display folds b's subtree behind one line
        assert!(rendered.text.contains("▸ Subject b (2 hidden)"));
        assert!(!rendered.text.contains("Body b"));
    }

    #[test]
    fn loading_and_error_states_render_placeholders() {
        let mut state = IdeaPageState::new("en");
        state.is_loading = true;
        assert!(render_page(&state, 80).text.contains("Loading discussion…"));

        state.is_loading = false;
        state.error = Some("connection refused".into());
        let rendered = render_page(&state, 80);
        assert!(rendered.text.contains("could not load the thread"));
        assert!(rendered.text.contains("connection refused"));
    }

    #[test]
    fn empty_thread_renders_the_no_posts_row() {
        let state = loaded_state(Vec::new());
        assert!(render_page(&state, 80)
            .text
            .contains("No posts in this thread yet."));
    }

    #[test]
    fn html_bodies_are_rendered_as_text() {
        let mut p = post("a", None);
        p.body = "<p>Hello <strong>world</strong></p>".into();
        p.body_mime_type = BodyMimeType::TextHtml;
        let state = loaded_state(vec![p]);

        let rendered = render_page(&state, 80);
        assert!(rendered.text.contains("Hello"));
        assert!(!rendered.text.contains("<p>"));
    }

    #[test]
    fn metrics_track_line_offsets_in_document_order() {
        let mut first = post("a", None);
        first.extracts.push(Extract {
            id: "e1".into(),
            body: "important".into(),
            important: true,
        });
        let state = loaded_state(vec![first, post("c", None)]);

        let rendered = render_page(&state, 80);
        let top_a = rendered.metrics.anchor_top("a").unwrap();
        let top_c = rendered.metrics.anchor_top("c").unwrap();
        assert!(top_a < top_c);
        assert_eq!(rendered.metrics.nugget_height("a"), Some(LINE_HEIGHT));
        assert_eq!(rendered.metrics.nugget_height("c"), None);
    }

    #[test]
    fn gutter_lists_resolved_offsets_and_extracts() {
        let overlays = vec![NuggetOverlay {
            post_id: "a".into(),
            row_path: vec![0],
            extracts: vec![Extract {
                id: "e1".into(),
                body: "key insight".into(),
                important: true,
            }],
        }];
        let positions = vec![NuggetPosition {
            post_id: "a".into(),
            anchor_top: Some(32.0),
            forced_top: None,
        }];

        let gutter = render_nugget_gutter(&positions, &overlays);
        assert!(gutter.contains("@32px post a"));
        assert!(gutter.contains("★ key insight"));

        assert_eq!(render_nugget_gutter(&[], &[]), "");
    }
}
