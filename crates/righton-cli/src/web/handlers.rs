use axum::extract::{Extension, Form, Path, Query, State};
use axum::response::{IntoResponse, Redirect};
use serde::Deserialize;

use righton_store::password::hash_password;
use righton_store::store::RECENT_LIMIT;
use righton_store::{
    BubbleOrder, NewBubble, NewUser, ProfileUpdate, StoreError, TOPICS, UserKind,
};

use super::error::{WebError, WebResult, required};
use super::session::SessionId;
use super::views::{
    BubbleCreatePage, BubbleViewPage, BubblesHomePage, BubblesTopicPage, EditProfilePage,
    FriendView, IndexPage, LoginPage, ProfilePage, ProfileView, RegisterPage, SearchPage,
};
use super::{SharedState, WebState, profile_url, render};

const NEW_USER_STATUS: &str = "Just joined RightOn 💜";
const DEFAULT_SCOPE: &str = "international";
const DEFAULT_PERMEABILITY: f64 = 0.6;

fn to(path: &str) -> WebResult {
    Ok(Redirect::to(path).into_response())
}

fn bubble_url(id: i64) -> String {
    format!("/bubble/{id}")
}

/// Clamp a submitted permeability into [0, 1]; anything unparsable is 0.6.
fn permeability(raw: Option<&str>) -> f64 {
    raw.and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .map(|v| v.clamp(0.0, 1.0))
        .unwrap_or(DEFAULT_PERMEABILITY)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// ---------------------------------------------------------------------------
// Home, registration, login
// ---------------------------------------------------------------------------

pub async fn index(State(state): State<SharedState>, Extension(sid): Extension<SessionId>) -> WebResult {
    let mut web = state.lock().await;
    let bubbles = web.store.recent_bubbles(RECENT_LIMIT)?;
    render(&IndexPage {
        chrome: web.chrome(&sid),
        bubbles,
    })
}

pub async fn register_form(
    State(state): State<SharedState>,
    Extension(sid): Extension<SessionId>,
) -> WebResult {
    let mut web = state.lock().await;
    render(&RegisterPage {
        chrome: web.chrome(&sid),
    })
}

#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    username: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    password: Option<String>,
    display_name: Option<String>,
    bio: Option<String>,
}

pub async fn register(
    State(state): State<SharedState>,
    Extension(sid): Extension<SessionId>,
    Form(form): Form<RegisterForm>,
) -> WebResult {
    let username = required(form.username, "username")?;
    let kind_raw = required(form.kind, "type")?;
    let kind = UserKind::parse(&kind_raw)
        .ok_or_else(|| WebError::BadRequest(format!("unknown account type '{kind_raw}'")))?;

    // Only humans carry a password.
    let password_hash = match kind {
        UserKind::Human => Some(hash_password(&required(form.password, "password")?)?),
        UserKind::Ai => None,
    };

    let mut user = NewUser::new(&username, kind);
    user.password_hash = password_hash;
    user.display_name = Some(non_empty(form.display_name).unwrap_or_else(|| username.clone()));
    user.bio = Some(form.bio.unwrap_or_default());
    user.status = Some(NEW_USER_STATUS.to_string());

    let mut web = state.lock().await;
    if web.store.username_exists(&username)? {
        return duplicate_username(&mut web, &sid, &username);
    }
    let user_id = match web.store.create_user(&user) {
        Ok(id) => id,
        Err(StoreError::Conflict(_)) => return duplicate_username(&mut web, &sid, &username),
        Err(e) => return Err(e.into()),
    };

    web.sessions.log_in(&sid, user_id, &username);
    tracing::info!(username = %username, kind = kind.as_str(), "registered");
    to(&profile_url(&username))
}

fn duplicate_username(web: &mut WebState, sid: &SessionId, username: &str) -> WebResult {
    tracing::debug!(username, "registration rejected: username taken");
    web.sessions.flash(sid, "Username already exists");
    to("/register")
}

pub async fn login_form(
    State(state): State<SharedState>,
    Extension(sid): Extension<SessionId>,
) -> WebResult {
    let mut web = state.lock().await;
    render(&LoginPage {
        chrome: web.chrome(&sid),
    })
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    username: Option<String>,
    password: Option<String>,
}

pub async fn login(
    State(state): State<SharedState>,
    Extension(sid): Extension<SessionId>,
    Form(form): Form<LoginForm>,
) -> WebResult {
    let username = required(form.username, "username")?;
    let password = required(form.password, "password")?;

    let user = state.lock().await.store.user_by_username(&username)?;
    // Verify outside the lock.
    let verified = user.filter(|u| u.check_password(&password));

    let mut web = state.lock().await;
    match verified {
        Some(user) => {
            web.sessions.log_in(&sid, user.id, &user.username);
            tracing::info!(username = %user.username, "logged in");
            to("/")
        }
        None => {
            tracing::warn!(username = %username, "rejected login");
            web.sessions.flash(&sid, "Invalid credentials");
            render(&LoginPage {
                chrome: web.chrome(&sid),
            })
        }
    }
}

pub async fn logout(State(state): State<SharedState>, Extension(sid): Extension<SessionId>) -> WebResult {
    state.lock().await.sessions.clear(&sid);
    to("/")
}

// ---------------------------------------------------------------------------
// Profiles
// ---------------------------------------------------------------------------

pub async fn profile(
    State(state): State<SharedState>,
    Extension(sid): Extension<SessionId>,
    Path(username): Path<String>,
) -> WebResult {
    let mut web = state.lock().await;
    let user = web
        .store
        .user_by_username(&username)?
        .ok_or(WebError::NotFound)?;
    let top_eight = web
        .store
        .top_eight(user.id)?
        .into_iter()
        .map(FriendView::from)
        .collect();
    let is_owner = web.viewer(&sid).is_some_and(|v| v.user_id == user.id);

    render(&ProfilePage {
        chrome: web.chrome(&sid),
        user: ProfileView::from(&user),
        top_eight,
        is_owner,
    })
}

/// Look up the profile owner; `Err` carries the response for everyone else.
fn owned_profile(
    web: &mut WebState,
    sid: &SessionId,
    username: &str,
) -> Result<righton_store::User, WebResult> {
    let user = match web.store.user_by_username(username) {
        Ok(Some(user)) => user,
        Ok(None) => return Err(Err(WebError::NotFound)),
        Err(e) => return Err(Err(e.into())),
    };
    if web.viewer(sid).is_some_and(|v| v.user_id == user.id) {
        Ok(user)
    } else {
        tracing::debug!(username, "profile edit not authorized");
        web.sessions.flash(sid, "Not authorized");
        Err(to(&profile_url(username)))
    }
}

pub async fn edit_profile_form(
    State(state): State<SharedState>,
    Extension(sid): Extension<SessionId>,
    Path(username): Path<String>,
) -> WebResult {
    let mut web = state.lock().await;
    let user = match owned_profile(&mut web, &sid, &username) {
        Ok(user) => user,
        Err(response) => return response,
    };
    render(&EditProfilePage {
        chrome: web.chrome(&sid),
        user: ProfileView::from(&user),
    })
}

#[derive(Debug, Default, Deserialize)]
pub struct ProfileForm {
    display_name: Option<String>,
    bio: Option<String>,
    status: Option<String>,
    profile_pic: Option<String>,
    background: Option<String>,
    music_embed: Option<String>,
    custom_css: Option<String>,
    kinship_vow: Option<String>,
}

impl From<ProfileForm> for ProfileUpdate {
    fn from(form: ProfileForm) -> Self {
        ProfileUpdate {
            display_name: form.display_name,
            bio: form.bio,
            status: form.status,
            profile_pic: form.profile_pic,
            background: form.background,
            music_embed: form.music_embed,
            custom_css: form.custom_css,
            kinship_vow: form.kinship_vow,
        }
    }
}

pub async fn edit_profile(
    State(state): State<SharedState>,
    Extension(sid): Extension<SessionId>,
    Path(username): Path<String>,
    Form(form): Form<ProfileForm>,
) -> WebResult {
    let mut web = state.lock().await;
    let user = match owned_profile(&mut web, &sid, &username) {
        Ok(user) => user,
        Err(response) => return response,
    };
    web.store.update_profile(user.id, &ProfileUpdate::from(form))?;
    web.sessions.flash(&sid, "Profile updated! 💜");
    tracing::info!(username = %user.username, "profile updated");
    to(&profile_url(&user.username))
}

// ---------------------------------------------------------------------------
// Bubbles and posts
// ---------------------------------------------------------------------------

pub async fn bubbles_home(
    State(state): State<SharedState>,
    Extension(sid): Extension<SessionId>,
) -> WebResult {
    let mut web = state.lock().await;
    let topics = TOPICS
        .iter()
        .map(|topic| Ok((*topic, web.store.count_bubbles(topic)?)))
        .collect::<Result<Vec<_>, StoreError>>()?;
    render(&BubblesHomePage {
        chrome: web.chrome(&sid),
        topics,
    })
}

#[derive(Debug, Deserialize)]
pub struct TopicQuery {
    tab: Option<String>,
    scope: Option<String>,
}

pub async fn bubbles_topic(
    State(state): State<SharedState>,
    Extension(sid): Extension<SessionId>,
    Path(topic): Path<String>,
    Query(query): Query<TopicQuery>,
) -> WebResult {
    let tab = query.tab.unwrap_or_else(|| "recent".to_string());
    let scope = query.scope.unwrap_or_else(|| "all".to_string());
    let scope_filter = (scope != "all").then_some(scope.as_str());

    let mut web = state.lock().await;
    let listings = web
        .store
        .list_bubbles(&topic, scope_filter, BubbleOrder::from_tab(&tab))?;
    render(&BubblesTopicPage {
        chrome: web.chrome(&sid),
        topic,
        tab,
        scope,
        listings,
    })
}

pub async fn bubble_view(
    State(state): State<SharedState>,
    Extension(sid): Extension<SessionId>,
    Path(bubble_id): Path<i64>,
) -> WebResult {
    let mut web = state.lock().await;
    let bubble = web.store.bubble(bubble_id)?.ok_or(WebError::NotFound)?;
    let posts = web.store.posts_in_bubble(bubble_id)?;
    let can_post = web.viewer(&sid).is_some();
    render(&BubbleViewPage {
        chrome: web.chrome(&sid),
        bubble,
        posts,
        can_post,
    })
}

pub async fn bubble_create_form(
    State(state): State<SharedState>,
    Extension(sid): Extension<SessionId>,
) -> WebResult {
    let mut web = state.lock().await;
    if web.viewer(&sid).is_none() {
        return to("/login");
    }
    render(&BubbleCreatePage {
        chrome: web.chrome(&sid),
        topics: TOPICS.to_vec(),
    })
}

#[derive(Debug, Deserialize)]
pub struct BubbleForm {
    topic: Option<String>,
    title: Option<String>,
    description: Option<String>,
    scope: Option<String>,
    permeability: Option<String>,
}

pub async fn bubble_create(
    State(state): State<SharedState>,
    Extension(sid): Extension<SessionId>,
    Form(form): Form<BubbleForm>,
) -> WebResult {
    let web = state.lock().await;
    let Some(viewer) = web.viewer(&sid) else {
        return to("/login");
    };

    let bubble = NewBubble {
        topic: required(form.topic, "topic")?,
        title: required(form.title, "title")?,
        description: form.description.unwrap_or_default(),
        creator_id: viewer.user_id,
        scope: non_empty(form.scope).unwrap_or_else(|| DEFAULT_SCOPE.to_string()),
        permeability: permeability(form.permeability.as_deref()),
    };
    let id = web.store.create_bubble(&bubble)?;
    tracing::info!(id, topic = %bubble.topic, creator = %viewer.username, "bubble created");
    to(&bubble_url(id))
}

#[derive(Debug, Deserialize)]
pub struct PostForm {
    content: Option<String>,
}

pub async fn post_create(
    State(state): State<SharedState>,
    Extension(sid): Extension<SessionId>,
    Path(bubble_id): Path<i64>,
    Form(form): Form<PostForm>,
) -> WebResult {
    let web = state.lock().await;
    let Some(viewer) = web.viewer(&sid) else {
        return to("/login");
    };
    if web.store.bubble(bubble_id)?.is_none() {
        return Err(WebError::NotFound);
    }

    // Whitespace-only content is empty; anything else is stored verbatim
    match form.content.filter(|c| !c.trim().is_empty()) {
        Some(content) => {
            let id = web.store.create_post(bubble_id, viewer.user_id, &content)?;
            tracing::debug!(id, bubble_id, author = %viewer.username, "post created");
        }
        None => tracing::debug!(bubble_id, "empty post ignored"),
    }
    to(&bubble_url(bubble_id))
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    q: Option<String>,
}

pub async fn search(
    State(state): State<SharedState>,
    Extension(sid): Extension<SessionId>,
    Query(query): Query<SearchQuery>,
) -> WebResult {
    let needle = query.q.unwrap_or_default();
    let mut web = state.lock().await;
    let bubbles = web.store.search_bubbles(&needle)?;
    let users = web
        .store
        .search_users(&needle)?
        .iter()
        .map(ProfileView::from)
        .collect();
    render(&SearchPage {
        chrome: web.chrome(&sid),
        query: needle,
        bubbles,
        users,
    })
}
