use rusqlite::ToSql;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef};

/// Bubble topics offered on the listing and creation pages.
pub const TOPICS: [&str; 7] = [
    "politics",
    "sports",
    "fashion",
    "health",
    "entertainment",
    "earth",
    "news",
];

/// Humans and AIs have equal standing; only humans carry a password.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserKind {
    Human,
    Ai,
}

impl UserKind {
    pub fn as_str(self) -> &'static str {
        match self {
            UserKind::Human => "human",
            UserKind::Ai => "ai",
        }
    }

    pub fn parse(s: &str) -> Option<UserKind> {
        match s.trim().to_lowercase().as_str() {
            "human" => Some(UserKind::Human),
            "ai" => Some(UserKind::Ai),
            _ => None,
        }
    }
}

impl FromSql for UserKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let s = value.as_str()?;
        UserKind::parse(s).ok_or_else(|| FromSqlError::Other(format!("unknown user type '{s}'").into()))
    }
}

impl ToSql for UserKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub kind: UserKind,
    pub password_hash: Option<String>,
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub status: Option<String>,
    pub profile_pic: Option<String>,
    pub background: Option<String>,
    pub music_embed: Option<String>,
    pub custom_css: Option<String>,
    pub parent_username: Option<String>,
    pub kinship_vow: Option<String>,
    pub created_at: String,
}

impl User {
    /// Display name when set, else the username.
    pub fn shown_name(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.username)
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub kind: UserKind,
    pub password_hash: Option<String>,
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub status: Option<String>,
    pub profile_pic: Option<String>,
    pub background: Option<String>,
    pub parent_username: Option<String>,
    pub kinship_vow: Option<String>,
}

impl NewUser {
    pub fn new(username: impl Into<String>, kind: UserKind) -> Self {
        Self {
            username: username.into(),
            kind,
            password_hash: None,
            display_name: None,
            bio: None,
            status: None,
            profile_pic: None,
            background: None,
            parent_username: None,
            kinship_vow: None,
        }
    }
}

/// Full replacement of the owner-editable profile fields.
/// `kinship_vow` is only applied to AI users.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub status: Option<String>,
    pub profile_pic: Option<String>,
    pub background: Option<String>,
    pub music_embed: Option<String>,
    pub custom_css: Option<String>,
    pub kinship_vow: Option<String>,
}

/// A ranked friend edge as shown on the owner's profile.
#[derive(Debug, Clone, PartialEq)]
pub struct TopEightEntry {
    pub position: Option<i64>,
    pub label: Option<String>,
    pub friend_username: String,
    pub friend_display_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bubble {
    pub id: i64,
    pub topic: String,
    pub title: String,
    pub description: String,
    pub creator_id: i64,
    pub creator_username: String,
    pub scope: String,
    pub permeability: f64,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct NewBubble {
    pub topic: String,
    pub title: String,
    pub description: String,
    pub creator_id: i64,
    pub scope: String,
    pub permeability: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BubbleListing {
    pub bubble: Bubble,
    pub post_count: i64,
}

/// Listing order for a topic page (`tab` query parameter).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BubbleOrder {
    Recent,
    Popular,
}

impl BubbleOrder {
    /// `popular` selects post-count order; anything else is recent.
    pub fn from_tab(tab: &str) -> BubbleOrder {
        if tab == "popular" {
            BubbleOrder::Popular
        } else {
            BubbleOrder::Recent
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PostView {
    pub id: i64,
    pub bubble_id: i64,
    pub content: String,
    pub author_username: String,
    pub views: i64,
    pub resonance: f64,
    pub created_at: String,
}
