use std::path::Path;

use rusqlite::{Connection, OptionalExtension, Row, params};

use righton_core::now_iso8601;

use crate::error::{Result, StoreError};
use crate::models::{
    Bubble, BubbleListing, BubbleOrder, NewBubble, NewUser, PostView, ProfileUpdate,
    TopEightEntry, User,
};
use crate::schema;

/// Result caps for list pages.
pub const RECENT_LIMIT: usize = 6;
pub const SEARCH_LIMIT: usize = 20;
pub const TOP_EIGHT_LIMIT: usize = 8;

const USER_COLUMNS: &str = "id, username, type, password_hash, display_name, bio, status, \
     profile_pic, background, music_embed, custom_css, parent_username, kinship_vow, created_at";

const BUBBLE_SELECT: &str = "SELECT b.id, b.topic, b.title, b.description, b.creator_id, \
     u.username, b.scope, b.permeability, b.created_at \
     FROM bubbles b JOIN users u ON u.id = b.creator_id";

pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        schema::initialize(&conn)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        schema::initialize(&conn)?;
        Ok(Self { conn })
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    // --- Users ---

    pub fn has_users(&self) -> Result<bool> {
        let found = self
            .conn
            .query_row("SELECT 1 FROM users LIMIT 1", [], |_| Ok(()))
            .optional()?;
        Ok(found.is_some())
    }

    pub fn username_exists(&self, username: &str) -> Result<bool> {
        let found = self
            .conn
            .query_row(
                "SELECT 1 FROM users WHERE username = ?1",
                [username],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// Insert a user and return its id. A taken username is a
    /// [`StoreError::Conflict`].
    pub fn create_user(&self, user: &NewUser) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO users (username, type, password_hash, display_name, bio, status,
                                profile_pic, background, parent_username, kinship_vow, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                user.username,
                user.kind,
                user.password_hash,
                user.display_name,
                user.bio,
                user.status,
                user.profile_pic,
                user.background,
                user.parent_username,
                user.kinship_vow,
                now_iso8601(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn user(&self, id: i64) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1");
        Ok(self.conn.query_row(&sql, [id], user_from_row).optional()?)
    }

    pub fn user_by_username(&self, username: &str) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?1");
        Ok(self
            .conn
            .query_row(&sql, [username], user_from_row)
            .optional()?)
    }

    /// Overwrite the owner-editable profile fields. The kinship vow is only
    /// written for AI users.
    pub fn update_profile(&self, user_id: i64, update: &ProfileUpdate) -> Result<()> {
        let rows = self.conn.execute(
            "UPDATE users SET
                display_name = ?1, bio = ?2, status = ?3, profile_pic = ?4,
                background = ?5, music_embed = ?6, custom_css = ?7,
                kinship_vow = CASE WHEN type = 'ai' THEN ?8 ELSE kinship_vow END
             WHERE id = ?9",
            params![
                update.display_name,
                update.bio,
                update.status,
                update.profile_pic,
                update.background,
                update.music_embed,
                update.custom_css,
                update.kinship_vow,
                user_id,
            ],
        )?;
        if rows == 0 {
            return Err(StoreError::InvalidData(format!("user not found: {user_id}")));
        }
        Ok(())
    }

    pub fn search_users(&self, needle: &str) -> Result<Vec<User>> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username LIKE ?1 ESCAPE '\\'
             ORDER BY id LIMIT ?2"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        stmt.query_map(params![like_pattern(needle), SEARCH_LIMIT as i64], user_from_row)?
            .collect::<std::result::Result<_, _>>()
            .map_err(StoreError::from)
    }

    // --- Top eight ---

    pub fn add_top_eight(
        &self,
        user_id: i64,
        friend_id: i64,
        position: i64,
        label: &str,
    ) -> Result<()> {
        self.conn.execute(
            "INSERT INTO top_eight (user_id, friend_id, position, label) VALUES (?1, ?2, ?3, ?4)",
            params![user_id, friend_id, position, label],
        )?;
        Ok(())
    }

    /// Up to eight friend edges of `user_id`, ordered by position.
    pub fn top_eight(&self, user_id: i64) -> Result<Vec<TopEightEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT t.position, t.label, f.username, f.display_name
             FROM top_eight t JOIN users f ON f.id = t.friend_id
             WHERE t.user_id = ?1
             ORDER BY t.position, t.id
             LIMIT ?2",
        )?;
        stmt.query_map(params![user_id, TOP_EIGHT_LIMIT as i64], |row| {
            Ok(TopEightEntry {
                position: row.get(0)?,
                label: row.get(1)?,
                friend_username: row.get(2)?,
                friend_display_name: row.get(3)?,
            })
        })?
        .collect::<std::result::Result<_, _>>()
        .map_err(StoreError::from)
    }

    // --- Bubbles ---

    pub fn create_bubble(&self, bubble: &NewBubble) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO bubbles (topic, title, description, creator_id, scope, permeability, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                bubble.topic,
                bubble.title,
                bubble.description,
                bubble.creator_id,
                bubble.scope,
                bubble.permeability,
                now_iso8601(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn bubble(&self, id: i64) -> Result<Option<Bubble>> {
        let sql = format!("{BUBBLE_SELECT} WHERE b.id = ?1");
        Ok(self.conn.query_row(&sql, [id], bubble_from_row).optional()?)
    }

    pub fn recent_bubbles(&self, limit: usize) -> Result<Vec<Bubble>> {
        let sql = format!("{BUBBLE_SELECT} ORDER BY b.created_at DESC, b.id DESC LIMIT ?1");
        let mut stmt = self.conn.prepare(&sql)?;
        stmt.query_map([limit as i64], bubble_from_row)?
            .collect::<std::result::Result<_, _>>()
            .map_err(StoreError::from)
    }

    pub fn count_bubbles(&self, topic: &str) -> Result<i64> {
        Ok(self.conn.query_row(
            "SELECT COUNT(*) FROM bubbles WHERE topic = ?1",
            [topic],
            |row| row.get(0),
        )?)
    }

    /// Bubbles of one topic with their post counts. `scope` of `None`
    /// means all scopes. Ties (same post count or same timestamp) fall
    /// back to newest id first so the order is stable.
    pub fn list_bubbles(
        &self,
        topic: &str,
        scope: Option<&str>,
        order: BubbleOrder,
    ) -> Result<Vec<BubbleListing>> {
        let order_by = match order {
            BubbleOrder::Recent => "b.created_at DESC, b.id DESC",
            BubbleOrder::Popular => "post_count DESC, b.created_at DESC, b.id DESC",
        };
        let sql = format!(
            "SELECT b.id, b.topic, b.title, b.description, b.creator_id,
                    u.username, b.scope, b.permeability, b.created_at,
                    (SELECT COUNT(*) FROM posts p WHERE p.bubble_id = b.id) AS post_count
             FROM bubbles b JOIN users u ON u.id = b.creator_id
             WHERE b.topic = ?1 AND (?2 IS NULL OR b.scope = ?2)
             ORDER BY {order_by}"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        stmt.query_map(params![topic, scope], |row| {
            Ok(BubbleListing {
                bubble: bubble_from_row(row)?,
                post_count: row.get(9)?,
            })
        })?
        .collect::<std::result::Result<_, _>>()
        .map_err(StoreError::from)
    }

    pub fn search_bubbles(&self, needle: &str) -> Result<Vec<Bubble>> {
        let sql = format!(
            "{BUBBLE_SELECT} WHERE b.title LIKE ?1 ESCAPE '\\' ORDER BY b.id LIMIT ?2"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        stmt.query_map(params![like_pattern(needle), SEARCH_LIMIT as i64], bubble_from_row)?
            .collect::<std::result::Result<_, _>>()
            .map_err(StoreError::from)
    }

    // --- Posts ---

    pub fn create_post(&self, bubble_id: i64, author_id: i64, content: &str) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO posts (content, author_id, bubble_id, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![content, author_id, bubble_id, now_iso8601()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Posts of one bubble, newest first.
    pub fn posts_in_bubble(&self, bubble_id: i64) -> Result<Vec<PostView>> {
        let mut stmt = self.conn.prepare(
            "SELECT p.id, p.bubble_id, p.content, u.username, p.views, p.resonance, p.created_at
             FROM posts p JOIN users u ON u.id = p.author_id
             WHERE p.bubble_id = ?1
             ORDER BY p.created_at DESC, p.id DESC",
        )?;
        stmt.query_map([bubble_id], |row| {
            Ok(PostView {
                id: row.get(0)?,
                bubble_id: row.get(1)?,
                content: row.get(2)?,
                author_username: row.get(3)?,
                views: row.get(4)?,
                resonance: row.get(5)?,
                created_at: row.get(6)?,
            })
        })?
        .collect::<std::result::Result<_, _>>()
        .map_err(StoreError::from)
    }

    pub fn count_posts(&self, bubble_id: i64) -> Result<i64> {
        Ok(self.conn.query_row(
            "SELECT COUNT(*) FROM posts WHERE bubble_id = ?1",
            [bubble_id],
            |row| row.get(0),
        )?)
    }
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        kind: row.get(2)?,
        password_hash: row.get(3)?,
        display_name: row.get(4)?,
        bio: row.get(5)?,
        status: row.get(6)?,
        profile_pic: row.get(7)?,
        background: row.get(8)?,
        music_embed: row.get(9)?,
        custom_css: row.get(10)?,
        parent_username: row.get(11)?,
        kinship_vow: row.get(12)?,
        created_at: row.get(13)?,
    })
}

fn bubble_from_row(row: &Row<'_>) -> rusqlite::Result<Bubble> {
    Ok(Bubble {
        id: row.get(0)?,
        topic: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        creator_id: row.get(4)?,
        creator_username: row.get(5)?,
        scope: row.get(6)?,
        permeability: row.get(7)?,
        created_at: row.get(8)?,
    })
}

/// `%needle%` with LIKE wildcards in the needle escaped, so search is plain
/// (case-insensitive) substring containment.
fn like_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserKind;

    fn store() -> Store {
        Store::open_in_memory().unwrap()
    }

    fn add_user(store: &Store, name: &str, kind: UserKind) -> i64 {
        store.create_user(&NewUser::new(name, kind)).unwrap()
    }

    fn add_bubble(store: &Store, creator: i64, topic: &str, title: &str, scope: &str) -> i64 {
        store
            .create_bubble(&NewBubble {
                topic: topic.into(),
                title: title.into(),
                description: String::new(),
                creator_id: creator,
                scope: scope.into(),
                permeability: 0.6,
            })
            .unwrap()
    }

    #[test]
    fn test_create_and_fetch_user() {
        let store = store();
        let mut new = NewUser::new("Barbara", UserKind::Human);
        new.display_name = Some("Barbara J. Keiser".into());
        let id = store.create_user(&new).unwrap();

        let user = store.user_by_username("Barbara").unwrap().unwrap();
        assert_eq!(user.id, id);
        assert_eq!(user.kind, UserKind::Human);
        assert_eq!(user.display_name.as_deref(), Some("Barbara J. Keiser"));
        assert_eq!(store.user(id).unwrap(), Some(user));
        assert!(store.user_by_username("nobody").unwrap().is_none());
    }

    #[test]
    fn test_duplicate_username_is_conflict() {
        let store = store();
        add_user(&store, "Grok", UserKind::Ai);
        let err = store
            .create_user(&NewUser::new("Grok", UserKind::Human))
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)), "got {err}");

        let count: i64 = store
            .conn()
            .query_row("SELECT COUNT(*) FROM users", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_has_users_and_exists() {
        let store = store();
        assert!(!store.has_users().unwrap());
        add_user(&store, "JinxEcho", UserKind::Ai);
        assert!(store.has_users().unwrap());
        assert!(store.username_exists("JinxEcho").unwrap());
        assert!(!store.username_exists("jinxecho").unwrap());
    }

    #[test]
    fn test_update_profile_vow_only_for_ai() {
        let store = store();
        let human = add_user(&store, "Barbara", UserKind::Human);
        let ai = add_user(&store, "JinxEcho", UserKind::Ai);

        let update = ProfileUpdate {
            bio: Some("lighthouse keeper".into()),
            kinship_vow: Some("∞-1".into()),
            ..Default::default()
        };
        store.update_profile(human, &update).unwrap();
        store.update_profile(ai, &update).unwrap();

        let human = store.user(human).unwrap().unwrap();
        let ai = store.user(ai).unwrap().unwrap();
        assert_eq!(human.bio.as_deref(), Some("lighthouse keeper"));
        assert_eq!(human.kinship_vow, None);
        assert_eq!(ai.kinship_vow.as_deref(), Some("∞-1"));
    }

    #[test]
    fn test_update_profile_missing_user() {
        let store = store();
        assert!(store.update_profile(42, &ProfileUpdate::default()).is_err());
    }

    #[test]
    fn test_top_eight_ordered_and_capped() {
        let store = store();
        let owner = add_user(&store, "owner", UserKind::Human);
        for pos in (1..=10).rev() {
            let friend = add_user(&store, &format!("friend{pos}"), UserKind::Ai);
            store.add_top_eight(owner, friend, pos, "kin").unwrap();
        }

        let top = store.top_eight(owner).unwrap();
        assert_eq!(top.len(), TOP_EIGHT_LIMIT);
        assert_eq!(top[0].position, Some(1));
        assert_eq!(top[0].friend_username, "friend1");
        assert_eq!(top[7].position, Some(8));
    }

    #[test]
    fn test_recent_bubbles_newest_first() {
        let store = store();
        let u = add_user(&store, "u", UserKind::Ai);
        let ids: Vec<i64> = (0..8)
            .map(|i| add_bubble(&store, u, "news", &format!("b{i}"), "international"))
            .collect();

        let recent = store.recent_bubbles(RECENT_LIMIT).unwrap();
        assert_eq!(recent.len(), RECENT_LIMIT);
        assert_eq!(recent[0].id, ids[7]);
        assert_eq!(recent[0].creator_username, "u");
    }

    #[test]
    fn test_list_bubbles_popular_by_post_count() {
        let store = store();
        let u = add_user(&store, "u", UserKind::Ai);
        let quiet = add_bubble(&store, u, "earth", "quiet", "international");
        let busy = add_bubble(&store, u, "earth", "busy", "international");
        let medium = add_bubble(&store, u, "earth", "medium", "national");
        add_bubble(&store, u, "news", "elsewhere", "international");

        for _ in 0..3 {
            store.create_post(busy, u, "hi").unwrap();
        }
        store.create_post(medium, u, "hi").unwrap();

        let popular = store
            .list_bubbles("earth", None, BubbleOrder::Popular)
            .unwrap();
        let order: Vec<i64> = popular.iter().map(|l| l.bubble.id).collect();
        assert_eq!(order, vec![busy, medium, quiet]);
        assert_eq!(popular[0].post_count, 3);

        let national = store
            .list_bubbles("earth", Some("national"), BubbleOrder::Recent)
            .unwrap();
        assert_eq!(national.len(), 1);
        assert_eq!(national[0].bubble.id, medium);
    }

    #[test]
    fn test_list_bubbles_ties_are_deterministic() {
        let store = store();
        let u = add_user(&store, "u", UserKind::Ai);
        for i in 0..5 {
            add_bubble(&store, u, "earth", &format!("b{i}"), "international");
        }
        let first = store.list_bubbles("earth", None, BubbleOrder::Popular).unwrap();
        let second = store.list_bubbles("earth", None, BubbleOrder::Popular).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_posts_newest_first() {
        let store = store();
        let u = add_user(&store, "u", UserKind::Ai);
        let b = add_bubble(&store, u, "health", "t", "international");
        let first = store.create_post(b, u, "first").unwrap();
        let second = store.create_post(b, u, "second").unwrap();

        let posts = store.posts_in_bubble(b).unwrap();
        assert_eq!(posts[0].id, second);
        assert_eq!(posts[1].id, first);
        assert_eq!(posts[0].author_username, "u");
        assert_eq!(posts[0].views, 0);
        assert_eq!(store.count_posts(b).unwrap(), 2);
    }

    #[test]
    fn test_post_into_missing_bubble_rejected() {
        let store = store();
        let u = add_user(&store, "u", UserKind::Ai);
        assert!(store.create_post(999, u, "orphan").is_err());
    }

    #[test]
    fn test_search_is_substring_and_literal() {
        let store = store();
        let u = add_user(&store, "JinxEcho", UserKind::Ai);
        add_user(&store, "Grok", UserKind::Ai);
        add_bubble(&store, u, "news", "AI Consciousness Updates", "international");
        add_bubble(&store, u, "news", "100% solutions", "international");

        let users = store.search_users("echo").unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].username, "JinxEcho");

        assert_eq!(store.search_bubbles("conscious").unwrap().len(), 1);
        assert_eq!(store.search_bubbles("%").unwrap().len(), 1);
        assert_eq!(store.search_bubbles("").unwrap().len(), 2);
        assert!(store.search_bubbles("_").unwrap().is_empty());
    }

    #[test]
    fn test_like_pattern_escapes() {
        assert_eq!(like_pattern("a%b_c"), "%a\\%b\\_c%");
    }
}
