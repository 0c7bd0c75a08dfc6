use crate::errors::{BlogError, Result};
use handlebars::Handlebars;
use serde::Serialize;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};

const LAYOUT_TEMPLATE: &str = r#"
<!doctype html>
<html lang="en">
  <head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width,initial-scale=1">
    <title>{{title}}</title>
  </head>
  <body class="{{template}}">
    <div id="container">
      {{{contents}}}
    </div>
  </body>
</html>
"#;

const FLASH_TEMPLATE: &str = r#"
{{#if flash}}
<div class="flash{{#if flash.error}} flash-error{{/if}}">{{flash.message}}</div>
{{/if}}
"#;

const ADMIN_LIST_TEMPLATE: &str = r#"
<h2>Blog Posts</h2>
{{> flash}}
<a href="{{base}}?new=1" class="button">New Post</a>
<table class="posts">
  <tr><th>Title</th><th>Slug</th><th>Date</th><th>Status</th><th>Actions</th></tr>
  {{#each posts}}
  <tr>
    <td>{{this.title}}</td>
    <td>{{this.slug}}</td>
    <td>{{this.date}}</td>
    <td>{{this.status}}</td>
    <td>
      <a href="{{../base}}?edit={{this.id}}">Edit</a>
      <a href="{{this.link}}" target="_blank">View</a>
    </td>
  </tr>
  {{/each}}
</table>
"#;

const ADMIN_FORM_TEMPLATE: &str = r#"
<h2>{{#if id}}Edit Post{{else}}New Post{{/if}}</h2>
{{> flash}}
<form method="POST" action="{{base}}" id="blog-post-form">
  <input type="hidden" name="action" value="save_post">
  {{#if id}}<input type="hidden" name="id" value="{{id}}">{{/if}}
  <div><label>Title:</label><input name="title" value="{{title}}"></div>
  <div><label>Slug:</label><input name="slug" value="{{slug}}" placeholder="auto-generated-if-empty"></div>
  <div class="hint">The slug should be URL-friendly (lowercase, no spaces). Example: my-blog-post</div>
  <div><label>Date:</label><input name="date" value="{{date}}"></div>
  <div><label>Status:</label>
    <select name="status">
      <option value="published"{{#if published}} selected{{/if}}>Published</option>
      <option value="draft"{{#unless published}} selected{{/unless}}>Draft</option>
    </select>
  </div>
  <div><label>Content:</label><textarea name="content" rows="20">{{content}}</textarea></div>
  <button type="submit">Save</button>
</form>
{{#if id}}
<form method="POST" action="{{base}}">
  <input type="hidden" name="action" value="delete_post">
  <input type="hidden" name="id" value="{{id}}">
  <button type="submit" onclick="return confirm('Delete this post?')">Delete</button>
</form>
{{/if}}
<a href="{{base}}">Back to list</a>
"#;

const ADMIN_MESSAGE_TEMPLATE: &str = r#"
{{> flash}}
<a href="{{base}}">Back to list</a>
"#;

const BLOG_LIST_TEMPLATE: &str = r#"
<div class="blog">
  <h1>{{title}}</h1>
  {{#each posts}}
  <article>
    <h2><a href="{{this.link}}">{{this.title}}</a></h2>
    <div class="date">{{this.date}}</div>
    <div class="prose">{{{this.excerpt}}}</div>
    <a href="{{this.link}}">Read more →</a>
  </article>
  {{/each}}
</div>
"#;

const BLOG_POST_TEMPLATE: &str = r#"
<article class="blog-post">
  <h1>{{title}}</h1>
  {{{contents}}}
</article>
"#;

#[derive(EnumIter, Display, Debug, Clone, Copy, PartialEq, Eq)]
#[strum(serialize_all = "snake_case")]
pub enum TemplateName {
    Layout,
    Flash,
    AdminList,
    AdminForm,
    AdminMessage,
    BlogList,
    BlogPost,
}

impl TemplateName {
    pub fn template_str(&self) -> &str {
        match self {
            TemplateName::Layout => LAYOUT_TEMPLATE,
            TemplateName::Flash => FLASH_TEMPLATE,
            TemplateName::AdminList => ADMIN_LIST_TEMPLATE,
            TemplateName::AdminForm => ADMIN_FORM_TEMPLATE,
            TemplateName::AdminMessage => ADMIN_MESSAGE_TEMPLATE,
            TemplateName::BlogList => BLOG_LIST_TEMPLATE,
            TemplateName::BlogPost => BLOG_POST_TEMPLATE,
        }
    }
}

/// Every built-in template, registered once.
pub struct Templates {
    h: Handlebars<'static>,
}

impl Templates {
    pub fn new() -> Result<Templates> {
        let mut h = Handlebars::new();
        for name in TemplateName::iter() {
            h.register_template_string(&name.to_string(), name.template_str().trim())
                .map_err(|source| BlogError::Template {
                    template_name: name.to_string(),
                    source: Box::new(source),
                })?;
        }
        Ok(Templates { h })
    }

    pub fn render<T: Serialize>(&self, name: TemplateName, args: &T) -> Result<String> {
        self.h
            .render(&name.to_string(), args)
            .map_err(|source| BlogError::Render {
                template_name: name.to_string(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AdminMessageArgs, BlogPostArgs, Flash};

    #[test]
    fn all_templates_register() {
        assert!(Templates::new().is_ok());
    }

    #[test]
    fn escapes_title_but_not_contents() {
        let templates = Templates::new().unwrap();
        let out = templates
            .render(
                TemplateName::BlogPost,
                &BlogPostArgs {
                    title: "<b>Hi</b>",
                    contents: "<p>body</p>",
                },
            )
            .unwrap();
        assert!(out.contains("&lt;b&gt;Hi&lt;/b&gt;"));
        assert!(out.contains("<p>body</p>"));
    }

    #[test]
    fn renders_flash_partial() {
        let templates = Templates::new().unwrap();
        let flash = Flash::error("Title must not be empty");
        let out = templates
            .render(
                TemplateName::AdminMessage,
                &AdminMessageArgs {
                    base: "/admin/blog",
                    flash: &flash,
                },
            )
            .unwrap();
        assert!(out.contains("flash-error"));
        assert!(out.contains("Title must not be empty"));
    }
}
