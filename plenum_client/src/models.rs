use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use plenum_core::models::{
    Author, BodyMimeType, Extract, Post, PublicationState, SentimentCounts, TranslatedContent,
};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorData {
    pub user_id: String,
    pub display_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExtractData {
    pub id: String,
    pub body: String,
    #[serde(default)]
    pub important: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SentimentCountsData {
    pub like: u32,
    pub disagree: u32,
    pub dont_understand: u32,
    pub more_info: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationData {
    pub locale_code: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub body: String,
}

/// One post as the GraphQL collaborator delivers it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostData {
    pub id: String,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub body_mime_type: Option<String>,
    pub creation_date: String,
    #[serde(default)]
    pub modification_date: Option<String>,
    pub creator: AuthorData,
    #[serde(default)]
    pub extracts: Vec<ExtractData>,
    #[serde(default)]
    pub sentiment_counts: SentimentCountsData,
    /// Option so an explicit JSON null degrades to the default state.
    #[serde(default)]
    pub publication_state: Option<PublicationState>,
    #[serde(default)]
    pub original_locale: String,
    #[serde(default)]
    pub translations: Vec<TranslationData>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostConnection {
    #[serde(default)]
    pub edges: Vec<PostEdge>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PostEdge {
    pub node: PostData,
}

/// The `IdeaWithPosts` query result.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdeaData {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub num_posts: u32,
    #[serde(default)]
    pub num_contributors: u32,
    #[serde(default)]
    pub posts: PostConnection,
}

#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostInput {
    pub idea_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    pub body: String,
}

#[derive(Debug, Error)]
pub enum WireError {
    #[error("post {id} carries an unparseable {field} timestamp: {source}")]
    BadTimestamp {
        id: String,
        field: &'static str,
        source: chrono::ParseError,
    },
}

impl SentimentCountsData {
    pub fn into_counts(self) -> SentimentCounts {
        SentimentCounts {
            like: self.like,
            disagree: self.disagree,
            dont_understand: self.dont_understand,
            more_info: self.more_info,
        }
    }
}

impl PostData {
    /// Converts the wire shape into the core model.
    pub fn into_post(self) -> Result<Post, WireError> {
        let creation_date = parse_timestamp(&self.id, "creation", &self.creation_date)?;
        let modification_date = match &self.modification_date {
            Some(raw) => Some(parse_timestamp(&self.id, "modification", raw)?),
            None => None,
        };
        let translations: HashMap<String, TranslatedContent> = self
            .translations
            .into_iter()
            .map(|t| {
                (
                    t.locale_code,
                    TranslatedContent {
                        subject: t.subject,
                        body: t.body,
                    },
                )
            })
            .collect();

        Ok(Post {
            id: self.id,
            parent_id: self.parent_id,
            subject: self.subject,
            body: self.body,
            body_mime_type: self
                .body_mime_type
                .as_deref()
                .map(BodyMimeType::from_mime)
                .unwrap_or_default(),
            creation_date,
            modification_date,
            creator: Author {
                user_id: self.creator.user_id,
                display_name: self.creator.display_name,
            },
            extracts: self
                .extracts
                .into_iter()
                .map(|e| Extract {
                    id: e.id,
                    body: e.body,
                    important: e.important,
                })
                .collect(),
            sentiment_counts: self.sentiment_counts.into_counts(),
            publication_state: self.publication_state.unwrap_or_default(),
            original_locale: self.original_locale,
            translations,
        })
    }
}

fn parse_timestamp(
    id: &str,
    field: &'static str,
    raw: &str,
) -> Result<DateTime<Utc>, WireError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|source| WireError::BadTimestamp {
            id: id.to_string(),
            field,
            source,
        })
}

/// Converts a page of wire posts, skipping the ones that fail with a warning.
pub fn convert_posts(data: Vec<PostData>) -> Vec<Post> {
    data.into_iter()
        .filter_map(|post| match post.into_post() {
            Ok(post) => Some(post),
            Err(err) => {
                log::warn!("skipping malformed post: {err}");
                None
            }
        })
        .collect()
}
