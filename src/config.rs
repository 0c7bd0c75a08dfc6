use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "blog.toml";

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct BlogConfig {
    /// JSON document holding every post.
    pub posts_file: PathBuf,
    /// First path segment of the public routes, `blog` serves `/blog/<slug>`.
    pub route_prefix: String,
    /// Template the host should use for pages the blog handles.
    pub template: String,
    /// Characters of content shown per post on the list page.
    pub excerpt_len: usize,
    pub address: String,
    pub admin_path: String,
}

impl Default for BlogConfig {
    fn default() -> BlogConfig {
        BlogConfig {
            posts_file: PathBuf::from("content/blog_posts.json"),
            route_prefix: "blog".to_owned(),
            template: "blog".to_owned(),
            excerpt_len: 300,
            address: "127.0.0.1:3000".to_owned(),
            admin_path: "/admin/blog".to_owned(),
        }
    }
}

impl BlogConfig {
    /// Read a config file. A relative `posts_file` is resolved against the
    /// directory containing the config.
    pub fn load(path: &Path) -> Result<BlogConfig, ConfigError> {
        let toml_str = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = BlogConfig::parse(&toml_str).map_err(|e| match e {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            },
            e => e,
        })?;
        if config.posts_file.is_relative() {
            if let Some(dir) = path.parent() {
                config.posts_file = dir.join(&config.posts_file);
            }
        }
        Ok(config)
    }

    pub fn parse(toml_str: &str) -> Result<BlogConfig, ConfigError> {
        let mut config: BlogConfig =
            toml::from_str(toml_str).map_err(|source| ConfigError::Parse {
                path: PathBuf::from(CONFIG_FILE),
                source,
            })?;
        let prefix = config.route_prefix.trim_matches('/').to_owned();
        if prefix.is_empty() || prefix.contains('/') {
            return Err(ConfigError::RoutePrefix(config.route_prefix));
        }
        config.route_prefix = prefix;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }
}
