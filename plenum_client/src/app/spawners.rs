use plenum_core::SentimentKind;

use crate::models::CreatePostInput;

use super::tasks;
use super::IdeaPage;

impl IdeaPage {
    pub fn spawn_load_idea(&mut self) {
        if self.state.is_loading {
            return;
        }
        self.state.is_loading = true;
        tasks::load_idea(self.api.clone(), self.tx.clone(), self.idea_id.clone());
    }

    /// Reloads the flat post list. Expansion state survives the reload, so
    /// branches the user opened stay open.
    pub fn refetch(&mut self) {
        self.spawn_load_idea();
    }

    pub fn spawn_create_post(&mut self) {
        let body = self.state.new_post_body.trim().to_string();
        if body.is_empty() {
            self.state.new_post_error = Some("Post body cannot be empty".into());
            return;
        }
        let subject = self.state.new_post_subject.trim().to_string();
        let payload = CreatePostInput {
            idea_id: self.idea_id.clone(),
            parent_id: self.state.reply_to.clone(),
            subject: (!subject.is_empty()).then_some(subject),
            body,
        };
        self.state.new_post_sending = true;
        self.state.new_post_error = None;
        tasks::create_post(
            self.api.clone(),
            self.tx.clone(),
            self.idea_id.clone(),
            payload,
        );
    }

    pub fn spawn_add_sentiment(&mut self, post_id: &str, kind: SentimentKind) {
        tasks::add_sentiment(
            self.api.clone(),
            self.tx.clone(),
            post_id.to_string(),
            kind,
        );
    }

    pub fn spawn_delete_sentiment(&mut self, post_id: &str) {
        tasks::delete_sentiment(self.api.clone(), self.tx.clone(), post_id.to_string());
    }
}
