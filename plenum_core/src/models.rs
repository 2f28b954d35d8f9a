use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub user_id: String,
    pub display_name: String,
}

/// A highlighted sub-span of a post body, harvested by a moderator.
/// Extracts flagged `important` surface as nugget overlays beside the post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extract {
    pub id: String,
    pub body: String,
    #[serde(default)]
    pub important: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SentimentKind {
    Like,
    Disagree,
    DontUnderstand,
    MoreInfo,
}

impl SentimentKind {
    pub const ALL: [SentimentKind; 4] = [
        SentimentKind::Like,
        SentimentKind::Disagree,
        SentimentKind::DontUnderstand,
        SentimentKind::MoreInfo,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SentimentKind::Like => "agree",
            SentimentKind::Disagree => "disagree",
            SentimentKind::DontUnderstand => "don't understand",
            SentimentKind::MoreInfo => "more info",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SentimentCounts {
    pub like: u32,
    pub disagree: u32,
    pub dont_understand: u32,
    pub more_info: u32,
}

impl SentimentCounts {
    pub fn get(&self, kind: SentimentKind) -> u32 {
        match kind {
            SentimentKind::Like => self.like,
            SentimentKind::Disagree => self.disagree,
            SentimentKind::DontUnderstand => self.dont_understand,
            SentimentKind::MoreInfo => self.more_info,
        }
    }

    pub fn total(&self) -> u32 {
        self.like + self.disagree + self.dont_understand + self.more_info
    }

    fn accumulate(&mut self, other: &SentimentCounts) {
        self.like += other.like;
        self.disagree += other.disagree;
        self.dont_understand += other.dont_understand;
        self.more_info += other.more_info;
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PublicationState {
    #[default]
    Published,
    SubmittedAwaitingModeration,
    ModeratedTextOnDemand,
    ModeratedTextNeverAvailable,
    DeletedByUser,
    DeletedByAdmin,
    #[serde(other)]
    Unknown,
}

impl PublicationState {
    /// Whether posts in this state participate in sentiment totals.
    /// Deleted posts keep their slot in the tree but are not counted.
    pub fn is_countable(self) -> bool {
        matches!(
            self,
            PublicationState::Published
                | PublicationState::ModeratedTextOnDemand
                | PublicationState::ModeratedTextNeverAvailable
        )
    }

    pub fn is_deleted(self) -> bool {
        matches!(
            self,
            PublicationState::DeletedByUser | PublicationState::DeletedByAdmin
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BodyMimeType {
    #[default]
    TextPlain,
    TextHtml,
}

impl BodyMimeType {
    pub fn from_mime(mime: &str) -> Self {
        match mime {
            "text/html" => BodyMimeType::TextHtml,
            // "text/*" and anything unrecognized render as plain text
            _ => BodyMimeType::TextPlain,
        }
    }

    pub fn is_html(self) -> bool {
        matches!(self, BodyMimeType::TextHtml)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslatedContent {
    pub subject: String,
    pub body: String,
}

/// A single contribution in a discussion thread, as delivered by the
/// data-fetching layer. `parent_id == None` marks a top-level post.
#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    pub id: String,
    pub parent_id: Option<String>,
    pub subject: String,
    pub body: String,
    pub body_mime_type: BodyMimeType,
    pub creation_date: DateTime<Utc>,
    pub modification_date: Option<DateTime<Utc>>,
    pub creator: Author,
    pub extracts: Vec<Extract>,
    pub sentiment_counts: SentimentCounts,
    pub publication_state: PublicationState,
    /// Locale the post was originally authored in.
    pub original_locale: String,
    /// Server-side translations keyed by locale.
    pub translations: HashMap<String, TranslatedContent>,
}

/// Subject and body of a post in the locale the fallback chain resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedContent<'a> {
    pub subject: &'a str,
    pub body: &'a str,
    pub locale: &'a str,
}

impl Post {
    /// Selects the displayed content for a requested locale.
    ///
    /// Fallback chain: requested content locale, then the post's original
    /// authorship locale, then the raw subject/body fields untouched.
    pub fn content_in<'a>(&'a self, locale: &'a str) -> ResolvedContent<'a> {
        if let Some(content) = self.translations.get(locale) {
            return ResolvedContent {
                subject: &content.subject,
                body: &content.body,
                locale,
            };
        }
        if let Some(content) = self.translations.get(&self.original_locale) {
            return ResolvedContent {
                subject: &content.subject,
                body: &content.body,
                locale: &self.original_locale,
            };
        }
        ResolvedContent {
            subject: &self.subject,
            body: &self.body,
            locale: &self.original_locale,
        }
    }

    pub fn important_extracts(&self) -> Vec<Extract> {
        self.extracts
            .iter()
            .filter(|e| e.important)
            .cloned()
            .collect()
    }

    pub fn was_modified(&self) -> bool {
        self.modification_date.is_some()
    }
}

/// Sums sentiment counters over posts in countable publication states.
pub fn sentiment_totals<'a>(posts: impl IntoIterator<Item = &'a Post>) -> SentimentCounts {
    let mut totals = SentimentCounts::default();
    for post in posts {
        if post.publication_state.is_countable() {
            totals.accumulate(&post.sentiment_counts);
        }
    }
    totals
}

#[cfg(test)]
pub(crate) fn test_post(id: &str, parent_id: Option<&str>) -> Post {
    use chrono::TimeZone;

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
