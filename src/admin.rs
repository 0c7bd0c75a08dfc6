//! Admin pages: the post table, the new/edit form and the save and delete
//! actions posted from it.

use crate::errors::{BlogError, Result};
use crate::module::BlogModule;
use crate::render::MarkupRenderer;
use crate::repository::PostRepository;
use crate::store::PostStore;
use crate::templates::TemplateName;
use crate::types::{
    AdminFormArgs, AdminListArgs, AdminMessageArgs, AdminRow, Flash, PostId, PostInput, Status,
};
use chrono::Local;
use std::collections::HashMap;
use std::str::FromStr;
use tracing::{error, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

#[derive(Debug, Clone)]
pub struct AdminRequest {
    pub method: Method,
    pub form: HashMap<String, String>,
    pub query: HashMap<String, String>,
}

impl AdminRequest {
    pub fn get(query: HashMap<String, String>) -> AdminRequest {
        AdminRequest {
            method: Method::Get,
            form: HashMap::new(),
            query,
        }
    }

    pub fn post(form: HashMap<String, String>) -> AdminRequest {
        AdminRequest {
            method: Method::Post,
            form,
            query: HashMap::new(),
        }
    }

    fn field(&self, name: &str) -> Option<&str> {
        self.form.get(name).map(String::as_str)
    }

    fn id_field(&self) -> Option<std::result::Result<PostId, String>> {
        let raw = self.field("id")?.trim();
        if raw.is_empty() {
            return None;
        }
        Some(PostId::from_str(raw).map_err(|_| raw.to_owned()))
    }

    fn input(&self) -> PostInput {
        PostInput {
            title: self.field("title").unwrap_or_default().to_owned(),
            slug: self.field("slug").map(str::to_owned),
            date: self.field("date").map(str::to_owned),
            content: self.field("content").unwrap_or_default().to_owned(),
            status: self.field("status").and_then(|s| Status::from_str(s).ok()),
        }
    }
}

/// What a POST did, and what to show afterwards.
enum Outcome {
    Done(Flash),
    /// The submitted form is shown again with its values.
    Rejected {
        flash: Flash,
        id: Option<PostId>,
        input: PostInput,
    },
}

fn flash_for(e: &BlogError) -> Flash {
    if e.is_retryable() {
        Flash::error(format!("{e}. Nothing was lost, please try again."))
    } else {
        Flash::error(e.to_string())
    }
}

impl<S: PostStore, R: MarkupRenderer> BlogModule<S, R> {
    /// Apply the posted action, if any, then render the view selected by the
    /// query string.
    pub fn handle_admin_request(&self, request: &AdminRequest) -> Result<String> {
        let mut repo = self.open()?;
        let outcome = match request.method {
            Method::Post => self.apply_action(&mut repo, request),
            Method::Get => None,
        };
        match outcome {
            Some(Outcome::Rejected { flash, id, input }) => {
                self.render_form(Some(&flash), id, &input)
            }
            Some(Outcome::Done(flash)) => self.render_view(&repo, request, Some(&flash)),
            None => self.render_view(&repo, request, None),
        }
    }

    fn apply_action(
        &self,
        repo: &mut PostRepository<&S>,
        request: &AdminRequest,
    ) -> Option<Outcome> {
        match request.field("action")? {
            "save_post" => Some(self.save_post(repo, request)),
            "delete_post" => {
                let id = match request.id_field()? {
                    Ok(id) => id,
                    Err(raw) => {
                        let flash = Flash::error(format!("Invalid post id {raw:?}"));
                        return Some(Outcome::Done(flash));
                    }
                };
                if !repo.delete(id) {
                    let flash = Flash::success(format!("Post {id} was already deleted"));
                    return Some(Outcome::Done(flash));
                }
                Some(Outcome::Done(match repo.save() {
                    Ok(()) => Flash::success("Post deleted"),
                    Err(e) => {
                        let e = BlogError::from(e);
                        error!(error = %e, "failed to save posts");
                        flash_for(&e)
                    }
                }))
            }
            other => {
                warn!(action = other, "unknown admin action");
                None
            }
        }
    }

    fn save_post(&self, repo: &mut PostRepository<&S>, request: &AdminRequest) -> Outcome {
        let input = request.input();
        let id = match request.id_field() {
            None => None,
            Some(Ok(id)) => Some(id),
            Some(Err(raw)) => {
                return Outcome::Rejected {
                    flash: Flash::error(format!("Invalid post id {raw:?}")),
                    id: None,
                    input,
                }
            }
        };
        let saved = match id {
            Some(id) => repo
                .update(id, input.clone())
                .map_err(BlogError::from)
                .and_then(|post| post.map(|_| ()).ok_or(BlogError::NotFound(id))),
            None => repo.create(input.clone()).map(|_| ()).map_err(BlogError::from),
        };
        let result = saved.and_then(|()| repo.save().map_err(BlogError::from));
        match result {
            Ok(()) => Outcome::Done(Flash::success("Post saved")),
            Err(e) => {
                if e.is_retryable() {
                    error!(error = %e, "failed to save posts");
                }
                Outcome::Rejected {
                    flash: flash_for(&e),
                    id,
                    input,
                }
            }
        }
    }

    fn render_view(
        &self,
        repo: &PostRepository<&S>,
        request: &AdminRequest,
        flash: Option<&Flash>,
    ) -> Result<String> {
        if let Some(raw) = request.query.get("edit") {
            let post = PostId::from_str(raw)
                .ok()
                .and_then(|id| repo.find_by_id(id));
            return match post {
                Some(post) => self.templates.render(
                    TemplateName::AdminForm,
                    &AdminFormArgs {
                        base: &self.admin_path,
                        flash,
                        id: Some(post.id),
                        title: &post.title,
                        slug: &post.slug,
                        date: &post.date,
                        content: &post.content,
                        published: post.is_published(),
                    },
                ),
                None => self.templates.render(
                    TemplateName::AdminMessage,
                    &AdminMessageArgs {
                        base: &self.admin_path,
                        flash: &Flash::error("Post not found"),
                    },
                ),
            };
        }

        if request.query.contains_key("new") {
            let input = PostInput {
                date: Some(Local::now().format("%Y-%m-%d").to_string()),
                status: Some(Status::Published),
                ..PostInput::default()
            };
            return self.render_form(flash, None, &input);
        }

        let posts = repo
            .posts()
            .map(|post| AdminRow {
                id: post.id,
                title: &post.title,
                slug: &post.slug,
                date: &post.date,
                status: post.status.to_string(),
                link: self.router.post_link(&post.slug),
            })
            .collect();
        self.templates.render(
            TemplateName::AdminList,
            &AdminListArgs {
                base: &self.admin_path,
                flash,
                posts,
            },
        )
    }

    fn render_form(
        &self,
        flash: Option<&Flash>,
        id: Option<PostId>,
        input: &PostInput,
    ) -> Result<String> {
        self.templates.render(
            TemplateName::AdminForm,
            &AdminFormArgs {
                base: &self.admin_path,
                flash,
                id,
                title: &input.title,
                slug: input.slug.as_deref().unwrap_or_default(),
                date: input.date.as_deref().unwrap_or_default(),
                content: &input.content,
                published: input.status == Some(Status::Published),
            },
        )
    }
}
