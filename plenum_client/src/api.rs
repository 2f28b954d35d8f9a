use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use reqwest::blocking::Client;
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use plenum_core::SentimentKind;

use crate::models::{CreatePostInput, IdeaData, PostData, SentimentCountsData};

const IDEA_WITH_POSTS_QUERY: &str = r#"
query IdeaWithPosts($id: ID!) {
  idea: node(id: $id) {
    ... on Idea {
      id
      title
      numPosts
      numContributors
      posts {
        edges {
          node {
            id parentId subject body bodyMimeType
            creationDate modificationDate
            creator { userId displayName }
            extracts { id body important }
            sentimentCounts { like disagree dontUnderstand moreInfo }
            publicationState originalLocale
            translations { localeCode subject body }
          }
        }
      }
    }
  }
}
"#;

const CREATE_POST_MUTATION: &str = r#"
mutation createPost($ideaId: ID!, $parentId: ID, $subject: String, $body: String!) {
  createPost(ideaId: $ideaId, parentId: $parentId, subject: $subject, body: $body) {
    post {
      id parentId subject body bodyMimeType
      creationDate modificationDate
      creator { userId displayName }
      extracts { id body important }
      sentimentCounts { like disagree dontUnderstand moreInfo }
      publicationState originalLocale
      translations { localeCode subject body }
    }
  }
}
"#;

const ADD_SENTIMENT_MUTATION: &str = r#"
mutation addSentiment($postId: ID!, $type: SentimentTypes!) {
  addSentiment(postId: $postId, type: $type) {
    post {
      sentimentCounts { like disagree dontUnderstand moreInfo }
    }
  }
}
"#;

const DELETE_SENTIMENT_MUTATION: &str = r#"
mutation deleteSentiment($postId: ID!) {
  deleteSentiment(postId: $postId) {
    post {
      sentimentCounts { like disagree dontUnderstand moreInfo }
    }
  }
}
"#;

#[derive(Debug, Deserialize)]
struct GraphqlEnvelope<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphqlError>,
}

#[derive(Debug, Deserialize)]
struct GraphqlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct IdeaEnvelope {
    idea: Option<IdeaData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatePostEnvelope {
    create_post: PostWrapper,
}

#[derive(Debug, Deserialize)]
struct PostWrapper {
    post: PostData,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddSentimentEnvelope {
    add_sentiment: CountsWrapper,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeleteSentimentEnvelope {
    delete_sentiment: CountsWrapper,
}

#[derive(Debug, Deserialize)]
struct CountsWrapper {
    post: CountsPost,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CountsPost {
    sentiment_counts: SentimentCountsData,
}

/// Blocking client for the GraphQL data-fetching collaborator.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    client: Client,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let base = sanitize_base_url(base_url.into())?;
        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            base_url: base,
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn set_base_url(&mut self, base_url: impl Into<String>) -> Result<()> {
        self.base_url = sanitize_base_url(base_url.into())?;
        Ok(())
    }

    /// Fetches an idea and the flat post list of its discussion thread.
    pub fn idea_with_posts(&self, idea_id: &str) -> Result<IdeaData> {
        let variables = serde_json::json!({ "id": idea_id });
        let envelope: IdeaEnvelope = self.graphql(IDEA_WITH_POSTS_QUERY, variables)?;
        envelope
            .idea
            .ok_or_else(|| anyhow!("idea {idea_id} not found"))
    }

    pub fn create_post(&self, input: &CreatePostInput) -> Result<PostData> {
        let variables = serde_json::json!({
            "ideaId": input.idea_id,
            "parentId": input.parent_id,
            "subject": input.subject,
            "body": input.body,
        });
        let envelope: CreatePostEnvelope = self.graphql(CREATE_POST_MUTATION, variables)?;
        Ok(envelope.create_post.post)
    }

    pub fn add_sentiment(
        &self,
        post_id: &str,
        kind: SentimentKind,
    ) -> Result<SentimentCountsData> {
        let variables = serde_json::json!({ "postId": post_id, "type": kind });
        let envelope: AddSentimentEnvelope = self.graphql(ADD_SENTIMENT_MUTATION, variables)?;
        Ok(envelope.add_sentiment.post.sentiment_counts)
    }

    pub fn delete_sentiment(&self, post_id: &str) -> Result<SentimentCountsData> {
        let variables = serde_json::json!({ "postId": post_id });
        let envelope: DeleteSentimentEnvelope =
            self.graphql(DELETE_SENTIMENT_MUTATION, variables)?;
        Ok(envelope.delete_sentiment.post.sentiment_counts)
    }

    fn graphql<T: DeserializeOwned>(&self, query: &str, variables: Value) -> Result<T> {
        let url = self.url("/graphql")?;
        let payload = serde_json::json!({ "query": query, "variables": variables });
        let response = self
            .client
            .post(url)
            .json(&payload)
            .send()
            .context("GraphQL request failed")?
            .error_for_status()?;
        let envelope: GraphqlEnvelope<T> = response
            .json()
            .context("failed to decode GraphQL response")?;
        if let Some(error) = envelope.errors.first() {
            return Err(anyhow!("GraphQL error: {}", error.message));
        }
        envelope
            .data
            .ok_or_else(|| anyhow!("GraphQL response carried no data"))
    }

    fn url(&self, path: &str) -> Result<Url> {
        let mut url = Url::parse(&self.base_url).context("invalid base URL")?;
        url.set_path(path.trim_start_matches('/'));
        Ok(url)
    }
}

fn sanitize_base_url(mut base: String) -> Result<String> {
    if !base.starts_with("http://") && !base.starts_with("https://") {
        base = format!("http://{base}");
    }
    // Remove trailing slash for consistency
    while base.ends_with('/') {
        base.pop();
    }
    // Validate once
    let _ = Url::parse(&base).context("invalid base URL")?;
    Ok(base)
}
