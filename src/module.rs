//! The surface a host application calls into.
//!
//! A host forwards admin requests to [`BlogModule::handle_admin_request`],
//! asks [`BlogModule::route`] whether a public path belongs to the blog and
//! uses [`BlogModule::select_template`] to pick the page layout. Every call
//! loads the collection afresh from the store.

use crate::config::BlogConfig;
use crate::errors::Result;
use crate::render::{excerpt, Markdown, MarkupRenderer};
use crate::repository::PostRepository;
use crate::router::{PublicRouter, RouteOutcome};
use crate::store::PostStore;
use crate::templates::{TemplateName, Templates};
use crate::types::{BlogListArgs, BlogPostArgs, LayoutArgs, ListItem, Post};

const LIST_TITLE: &str = "Blog";
const NOT_FOUND_TITLE: &str = "Post Not Found";
const NOT_FOUND_CONTENT: &str = "<p>Sorry, that blog post does not exist.</p>";

/// A public page produced by the blog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub title: String,
    pub content: String,
    pub template: String,
    /// False for the "post does not exist" page.
    pub found: bool,
}

pub struct BlogModule<S, R = Markdown> {
    pub(crate) store: S,
    pub(crate) renderer: R,
    pub(crate) router: PublicRouter,
    pub(crate) templates: Templates,
    pub(crate) admin_path: String,
    excerpt_len: usize,
}

impl<S: PostStore> BlogModule<S> {
    pub fn with_markdown(store: S, config: &BlogConfig) -> Result<BlogModule<S>> {
        BlogModule::new(store, Markdown::default(), config)
    }
}

impl<S: PostStore, R: MarkupRenderer> BlogModule<S, R> {
    pub fn new(store: S, renderer: R, config: &BlogConfig) -> Result<BlogModule<S, R>> {
        Ok(BlogModule {
            store,
            renderer,
            router: PublicRouter::new(&config.route_prefix, &config.template),
            templates: Templates::new()?,
            admin_path: config.admin_path.clone(),
            excerpt_len: config.excerpt_len,
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn router(&self) -> &PublicRouter {
        &self.router
    }

    pub(crate) fn open(&self) -> Result<PostRepository<&S>> {
        Ok(PostRepository::open(&self.store)?)
    }

    pub fn resolve_public_path(&self, path: &str) -> Result<RouteOutcome> {
        if !self.router.handles(path) {
            return Ok(RouteOutcome::Unhandled);
        }
        let repo = self.open()?;
        Ok(self.router.resolve(&repo, path))
    }

    pub fn select_template(&self, path: &str) -> Option<&str> {
        self.router.select_template(path)
    }

    /// Resolve and render a public path. `None` means the blog does not own
    /// the path and the host should keep routing.
    pub fn route(&self, path: &str) -> Result<Option<Page>> {
        let template = match self.select_template(path) {
            Some(template) => template.to_owned(),
            None => return Ok(None),
        };
        let page = match self.resolve_public_path(path)? {
            RouteOutcome::Unhandled => return Ok(None),
            RouteOutcome::ListView(posts) => Page {
                title: LIST_TITLE.to_owned(),
                content: self.render_list(&posts)?,
                template,
                found: true,
            },
            RouteOutcome::SinglePost(post) => Page {
                content: self.templates.render(
                    TemplateName::BlogPost,
                    &BlogPostArgs {
                        title: &post.title,
                        contents: &self.renderer.render(&post.content),
                    },
                )?,
                title: post.title,
                template,
                found: true,
            },
            RouteOutcome::NotFound => Page {
                title: NOT_FOUND_TITLE.to_owned(),
                content: NOT_FOUND_CONTENT.to_owned(),
                template,
                found: false,
            },
        };
        Ok(Some(page))
    }

    /// Wrap a fragment in a complete HTML document, for hosts without a
    /// layout of their own.
    pub fn render_document(&self, title: &str, template: &str, contents: &str) -> Result<String> {
        self.templates.render(
            TemplateName::Layout,
            &LayoutArgs {
                title,
                template,
                contents,
            },
        )
    }

    fn render_list(&self, posts: &[Post]) -> Result<String> {
        let items = posts
            .iter()
            .map(|post| ListItem {
                title: &post.title,
                link: self.router.post_link(&post.slug),
                date: &post.date,
                excerpt: self
                    .renderer
                    .render(&excerpt(&post.content, self.excerpt_len)),
            })
            .collect();
        self.templates.render(
            TemplateName::BlogList,
            &BlogListArgs {
                title: LIST_TITLE,
                posts: items,
            },
        )
    }
}
