use plenum_core::models::Post;
use plenum_core::{NuggetRegistry, ThreadView};

use crate::models::IdeaData;

#[derive(Debug, Clone)]
pub struct IdeaSummary {
    pub id: String,
    pub title: String,
    pub num_posts: u32,
    pub num_contributors: u32,
}

impl From<&IdeaData> for IdeaSummary {
    fn from(data: &IdeaData) -> Self {
        Self {
            id: data.id.clone(),
            title: data.title.clone(),
            num_posts: data.num_posts,
            num_contributors: data.num_contributors,
        }
    }
}

/// Everything one idea page owns. All mutation happens on the thread that
/// owns this value; background fetches only report back via messages.
pub struct IdeaPageState {
    pub idea: Option<IdeaSummary>,
    /// The flat list as last delivered; the view holds the tree built from it.
    pub posts: Vec<Post>,
    pub thread_view: ThreadView,
    pub nuggets: NuggetRegistry,
    pub is_loading: bool,
    pub error: Option<String>,
    pub new_post_subject: String,
    pub new_post_body: String,
    pub reply_to: Option<String>,
    pub new_post_sending: bool,
    pub new_post_error: Option<String>,
    /// Deep-link target; resolved once the post shows up in a loaded tree.
    pub pending_scroll_target: Option<String>,
}

impl IdeaPageState {
    pub fn new(content_locale: &str) -> Self {
        Self {
            idea: None,
            posts: Vec::new(),
            thread_view: ThreadView::new(content_locale),
            nuggets: NuggetRegistry::new(),
            is_loading: false,
            error: None,
            new_post_subject: String::new(),
            new_post_body: String::new(),
            reply_to: None,
            new_post_sending: false,
            new_post_error: None,
            pending_scroll_target: None,
        }
    }
}
