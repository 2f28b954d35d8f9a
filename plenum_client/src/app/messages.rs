use log::{error, info};

use crate::models::{convert_posts, IdeaData, PostData, SentimentCountsData};

use super::state::IdeaSummary;
use super::IdeaPage;

pub enum AppMessage {
    IdeaLoaded {
        idea_id: String,
        result: Result<IdeaData, anyhow::Error>,
    },
    PostCreated {
        idea_id: String,
        result: Result<PostData, anyhow::Error>,
    },
    SentimentUpdated {
        post_id: String,
        result: Result<SentimentCountsData, anyhow::Error>,
    },
}

/// Drains the channel and applies each message to the page.
///
/// Every handler guards on the currently viewed idea, so a response landing
/// after navigation touches nothing. Overlapping refetches resolve
/// last-write-wins.
pub fn process_messages(page: &mut IdeaPage) {
    while let Ok(message) = page.rx.try_recv() {
        match message {
            AppMessage::IdeaLoaded { idea_id, result } => {
                if idea_id != page.idea_id {
                    continue;
                }
                page.state.is_loading = false;
                match result {
                    Ok(idea) => {
                        page.state.idea = Some(IdeaSummary::from(&idea));
                        let posts =
                            convert_posts(idea.posts.edges.into_iter().map(|e| e.node).collect());
                        page.state.thread_view.set_posts(&posts);
                        page.state.posts = posts;
                        page.state.error = None;

                        if let Some(target) = page.state.pending_scroll_target.clone() {
                            if page.state.thread_view.reveal(&target) {
                                page.state.pending_scroll_target = None;
                            }
                        }
                    }
                    Err(err) => {
                        page.state.error = Some(err.to_string());
                    }
                }
            }
            AppMessage::PostCreated { idea_id, result } => {
                if idea_id != page.idea_id {
                    continue;
                }
                page.state.new_post_sending = false;
                match result {
                    Ok(post) => {
                        page.state.new_post_subject.clear();
                        page.state.new_post_body.clear();
                        page.state.reply_to = None;
                        page.state.new_post_error = None;
                        page.state.pending_scroll_target = Some(post.id.clone());
                        info!("post {} published, refetching thread", post.id);
                        page.refetch();
                    }
                    Err(err) => {
                        page.state.new_post_error = Some(err.to_string());
                    }
                }
            }
            AppMessage::SentimentUpdated { post_id, result } => match result {
                Ok(counts) => {
                    let counts = counts.into_counts();
                    if let Some(post) =
                        page.state.posts.iter_mut().find(|p| p.id == post_id)
                    {
                        post.sentiment_counts = counts;
                        page.state.thread_view.set_posts(&page.state.posts);
                    }
                }
                Err(err) => {
                    error!("failed to update sentiment on post {post_id}: {err}");
                }
            },
        }
    }
}
