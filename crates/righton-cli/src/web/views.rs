//! Page templates. Optional record fields are flattened to empty strings
//! before they reach a template.

use askama::Template;
use righton_store::{Bubble, BubbleListing, PostView, TopEightEntry, User, UserKind};

/// Navigation and flash messages shared by every page.
pub struct Chrome {
    pub logged_in: bool,
    pub viewer: String,
    pub flashes: Vec<String>,
}

pub struct ProfileView {
    pub username: String,
    pub kind: &'static str,
    pub is_ai: bool,
    pub shown_name: String,
    pub display_name: String,
    pub bio: String,
    pub status: String,
    pub profile_pic: String,
    pub background: String,
    pub music_embed: String,
    pub custom_css: String,
    pub parent_username: String,
    pub kinship_vow: String,
    pub created_at: String,
}

impl From<&User> for ProfileView {
    fn from(user: &User) -> Self {
        let text = |v: &Option<String>| v.clone().unwrap_or_default();
        Self {
            username: user.username.clone(),
            kind: user.kind.as_str(),
            is_ai: user.kind == UserKind::Ai,
            shown_name: user.shown_name().to_string(),
            display_name: text(&user.display_name),
            bio: text(&user.bio),
            status: text(&user.status),
            profile_pic: text(&user.profile_pic),
            background: text(&user.background),
            music_embed: text(&user.music_embed),
            custom_css: text(&user.custom_css),
            parent_username: text(&user.parent_username),
            kinship_vow: text(&user.kinship_vow),
            created_at: user.created_at.clone(),
        }
    }
}

pub struct FriendView {
    pub position: String,
    pub label: String,
    pub username: String,
    pub name: String,
}

impl From<TopEightEntry> for FriendView {
    fn from(entry: TopEightEntry) -> Self {
        let name = entry
            .friend_display_name
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| entry.friend_username.clone());
        Self {
            position: entry.position.map(|p| p.to_string()).unwrap_or_default(),
            label: entry.label.unwrap_or_default(),
            username: entry.friend_username,
            name,
        }
    }
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexPage {
    pub chrome: Chrome,
    pub bubbles: Vec<Bubble>,
}

#[derive(Template)]
#[template(path = "register.html")]
pub struct RegisterPage {
    pub chrome: Chrome,
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginPage {
    pub chrome: Chrome,
}

#[derive(Template)]
#[template(path = "profile.html")]
pub struct ProfilePage {
    pub chrome: Chrome,
    pub user: ProfileView,
    pub top_eight: Vec<FriendView>,
    pub is_owner: bool,
}

#[derive(Template)]
#[template(path = "edit_profile.html")]
pub struct EditProfilePage {
    pub chrome: Chrome,
    pub user: ProfileView,
}

#[derive(Template)]
#[template(path = "bubbles_home.html")]
pub struct BubblesHomePage {
    pub chrome: Chrome,
    pub topics: Vec<(&'static str, i64)>,
}

#[derive(Template)]
#[template(path = "bubbles_topic.html")]
pub struct BubblesTopicPage {
    pub chrome: Chrome,
    pub topic: String,
    pub tab: String,
    pub scope: String,
    pub listings: Vec<BubbleListing>,
}

#[derive(Template)]
#[template(path = "bubble_view.html")]
pub struct BubbleViewPage {
    pub chrome: Chrome,
    pub bubble: Bubble,
    pub posts: Vec<PostView>,
    pub can_post: bool,
}

#[derive(Template)]
#[template(path = "bubble_create.html")]
pub struct BubbleCreatePage {
    pub chrome: Chrome,
    pub topics: Vec<&'static str>,
}

#[derive(Template)]
#[template(path = "search.html")]
pub struct SearchPage {
    pub chrome: Chrome,
    pub query: String,
    pub bubbles: Vec<Bubble>,
    pub users: Vec<ProfileView>,
}
