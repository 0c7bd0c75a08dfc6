//! Public routes: `<prefix>` lists published posts and `<prefix>/<slug>`
//! shows one of them.
//!
//! Only published posts are reachable. A draft and a missing slug both
//! resolve to [`RouteOutcome::NotFound`] so visitors cannot probe for
//! unpublished content.

use crate::repository::PostRepository;
use crate::store::PostStore;
use crate::types::Post;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
    /// Published posts, newest first.
    ListView(Vec<Post>),
    SinglePost(Post),
    NotFound,
    /// Not a blog path; the host keeps routing.
    Unhandled,
}

impl RouteOutcome {
    pub fn is_handled(&self) -> bool {
        !matches!(self, RouteOutcome::Unhandled)
    }
}

#[derive(Debug, PartialEq, Eq)]
enum BlogPath<'a> {
    Root,
    Post(&'a str),
}

#[derive(Debug, Clone)]
pub struct PublicRouter {
    prefix: String,
    template: String,
}

impl PublicRouter {
    pub fn new(prefix: impl Into<String>, template: impl Into<String>) -> PublicRouter {
        PublicRouter {
            prefix: prefix.into(),
            template: template.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Public path of a post, with the slug percent-encoded.
    pub fn post_link(&self, slug: &str) -> String {
        format!("/{}/{}", self.prefix, urlencoding::encode(slug))
    }

    pub fn list_link(&self) -> String {
        format!("/{}", self.prefix)
    }

    fn match_path<'p>(&self, path: &'p str) -> Option<BlogPath<'p>> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let rest = path.trim_matches('/').strip_prefix(self.prefix.as_str())?;
        if rest.is_empty() {
            return Some(BlogPath::Root);
        }
        let segment = rest.strip_prefix('/')?;
        if segment.is_empty() || segment.contains('/') {
            return None;
        }
        Some(BlogPath::Post(segment))
    }

    pub fn handles(&self, path: &str) -> bool {
        self.match_path(path).is_some()
    }

    /// Template the host should render a blog page with, `None` for paths
    /// the blog does not own.
    pub fn select_template(&self, path: &str) -> Option<&str> {
        self.handles(path).then_some(self.template.as_str())
    }

    pub fn resolve<S: PostStore>(&self, repo: &PostRepository<S>, path: &str) -> RouteOutcome {
        let outcome = match self.match_path(path) {
            None => RouteOutcome::Unhandled,
            Some(BlogPath::Root) => RouteOutcome::ListView(
                repo.list_published(true).into_iter().cloned().collect(),
            ),
            Some(BlogPath::Post(segment)) => match urlencoding::decode(segment) {
                Ok(slug) => repo
                    .find_published(&slug)
                    .cloned()
                    .map_or(RouteOutcome::NotFound, RouteOutcome::SinglePost),
                Err(_) => RouteOutcome::NotFound,
            },
        };
        debug!(path, handled = outcome.is_handled(), "resolved public path");
        outcome
    }
}
