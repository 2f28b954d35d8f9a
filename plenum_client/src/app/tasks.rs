use std::sync::mpsc::Sender;
use std::thread;

use log::error;

use plenum_core::SentimentKind;

use crate::api::ApiClient;
use crate::models::CreatePostInput;

use super::messages::AppMessage;

pub fn load_idea(client: ApiClient, tx: Sender<AppMessage>, idea_id: String) {
    thread::spawn(move || {
        let result = client.idea_with_posts(&idea_id);
        if tx.send(AppMessage::IdeaLoaded { idea_id, result }).is_err() {
            error!("failed to send IdeaLoaded message");
        }
    });
}

pub fn create_post(
    client: ApiClient,
    tx: Sender<AppMessage>,
    idea_id: String,
    payload: CreatePostInput,
) {
    thread::spawn(move || {
        let result = client.create_post(&payload);
        let message = AppMessage::PostCreated { idea_id, result };
        if tx.send(message).is_err() {
            error!("failed to send PostCreated message");
        }
    });
}

pub fn add_sentiment(
    client: ApiClient,
    tx: Sender<AppMessage>,
    post_id: String,
    kind: SentimentKind,
) {
    thread::spawn(move || {
        let result = client.add_sentiment(&post_id, kind);
        let message = AppMessage::SentimentUpdated { post_id, result };
        if tx.send(message).is_err() {
            error!("failed to send SentimentUpdated message");
        }
    });
}

pub fn delete_sentiment(client: ApiClient, tx: Sender<AppMessage>, post_id: String) {
    thread::spawn(move || {
        let result = client.delete_sentiment(&post_id);
        let message = AppMessage::SentimentUpdated { post_id, result };
        if tx.send(message).is_err() {
            error!("failed to send SentimentUpdated message");
        }
    });
}
