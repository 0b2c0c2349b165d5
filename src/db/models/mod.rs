//! Database models split into separate files, re-exported here so callers
//! can `use crate::db::models::*;`.

pub mod activity;
pub mod collaborator;
pub mod comment;
pub mod notification;
pub mod permission;
pub mod prompt;
pub mod share_link;
pub mod version;

pub use self::activity::*;
pub use self::collaborator::*;
pub use self::comment::*;
pub use self::notification::*;
pub use self::permission::*;
pub use self::prompt::*;
pub use self::share_link::*;
pub use self::version::*;
