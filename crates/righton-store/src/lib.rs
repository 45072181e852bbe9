pub mod error;
pub mod memory_file;
pub mod models;
pub mod password;
pub mod paths;
pub mod schema;
pub mod seed;
pub mod store;

pub use error::{Result, StoreError};
pub use models::{
    Bubble, BubbleListing, BubbleOrder, NewBubble, NewUser, PostView, ProfileUpdate, TOPICS,
    TopEightEntry, User, UserKind,
};
pub use paths::{database_path, default_base_dir, resolve_base_dir};
pub use store::Store;
