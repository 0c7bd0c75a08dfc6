use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;
use strum_macros::{Display, EnumString};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct PostId(pub i64);

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for PostId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(PostId)
    }
}

#[derive(
    Serialize, Deserialize, Display, EnumString, Debug, Clone, Copy, Default, PartialEq, Eq,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Status {
    #[default]
    Draft,
    Published,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub slug: String,
    pub date: String,
    pub content: String,
    pub status: Status,
}

impl Post {
    pub fn is_published(&self) -> bool {
        self.status == Status::Published
    }
}

/// Fields submitted by the admin when saving a post. Blank optional fields
/// are resolved by the repository.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostInput {
    pub title: String,
    pub slug: Option<String>,
    pub date: Option<String>,
    pub content: String,
    pub status: Option<Status>,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Flash {
    pub error: bool,
    pub message: String,
}

impl Flash {
    pub fn error(message: impl Into<String>) -> Flash {
        Flash {
            error: true,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Flash {
        Flash {
            error: false,
            message: message.into(),
        }
    }
}

#[derive(Serialize)]
pub struct ListItem<'a> {
    pub title: &'a str,
    pub link: String,
    pub date: &'a str,
    pub excerpt: String,
}

#[derive(Serialize)]
pub struct BlogListArgs<'a> {
    pub title: &'a str,
    pub posts: Vec<ListItem<'a>>,
}

#[derive(Serialize)]
pub struct BlogPostArgs<'a> {
    pub title: &'a str,
    pub contents: &'a str,
}

#[derive(Serialize)]
pub struct AdminRow<'a> {
    pub id: PostId,
    pub title: &'a str,
    pub slug: &'a str,
    pub date: &'a str,
    pub status: String,
    pub link: String,
}

#[derive(Serialize)]
pub struct AdminListArgs<'a> {
    pub base: &'a str,
    pub flash: Option<&'a Flash>,
    pub posts: Vec<AdminRow<'a>>,
}

#[derive(Serialize)]
pub struct AdminFormArgs<'a> {
    pub base: &'a str,
    pub flash: Option<&'a Flash>,
    pub id: Option<PostId>,
    pub title: &'a str,
    pub slug: &'a str,
    pub date: &'a str,
    pub content: &'a str,
    pub published: bool,
}

#[derive(Serialize)]
pub struct AdminMessageArgs<'a> {
    pub base: &'a str,
    pub flash: &'a Flash,
}

#[derive(Serialize)]
pub struct LayoutArgs<'a> {
    pub title: &'a str,
    pub template: &'a str,
    pub contents: &'a str,
}
