pub mod activity;
pub mod collaborators;
pub mod comments;
pub mod maintenance;
pub mod notifications;
pub mod share_links;
pub mod versions;

pub use activity::ActivityService;
pub use collaborators::CollaboratorService;
pub use comments::CommentService;
pub use maintenance::spawn_cleanup_worker;
pub use notifications::{NotificationService, NotificationSink};
pub use share_links::{IssueShareLink, ShareLinkService, SharedPromptAccess};
pub use versions::VersionService;
