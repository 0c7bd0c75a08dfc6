pub mod admin;
pub mod config;
pub mod console;
pub mod errors;
pub mod handlers;
pub mod module;
pub mod render;
pub mod repository;
pub mod router;
pub mod server;
pub mod slug;
pub mod store;
pub mod templates;
pub mod types;

pub use admin::{AdminRequest, Method};
pub use config::BlogConfig;
pub use errors::{BlogError, PersistenceError, ValidationError};
pub use module::{BlogModule, Page};
pub use render::{Markdown, MarkupRenderer};
pub use repository::PostRepository;
pub use router::{PublicRouter, RouteOutcome};
pub use slug::slugify;
pub use store::{JsonFileStore, MemoryStore, PostStore};
pub use types::{Post, PostId, PostInput, Status};
