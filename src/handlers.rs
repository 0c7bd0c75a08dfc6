use crate::config::{BlogConfig, CONFIG_FILE};
use crate::console::{Notice, ServeConsole, Serving};
use crate::module::BlogModule;
use crate::server::{serve, AppState};
use crate::store::{JsonFileStore, PostStore};
use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;
use inquire::Confirm;
use std::path::Path;
use std::sync::Arc;
use tokio::fs::{create_dir_all, metadata, write};

pub async fn run_init(blog_dir: &Path, should_confirm: bool) -> Result<()> {
    let config_path = blog_dir.join(CONFIG_FILE);
    if let Ok(metadata) = metadata(&config_path).await {
        if metadata.is_dir() {
            return Err(eyre!("{} is a directory", config_path.display()));
        }

        if should_confirm {
            let ans = Confirm::new(
                format!("{} already exists. Continue?", config_path.display()).as_ref(),
            )
            .with_default(false)
            .with_help_message("The configuration is reset, existing posts are kept")
            .prompt()?;
            if !ans {
                return Ok(());
            }
        }
    }

    create_dir_all(blog_dir)
        .await
        .wrap_err_with(|| format!("Failed to create {}", blog_dir.display()))?;
    let config = BlogConfig::default();
    write(&config_path, config.to_toml()?)
        .await
        .wrap_err_with(|| format!("Failed to create {}", config_path.display()))?;

    let store = JsonFileStore::new(blog_dir.join(&config.posts_file));
    if store.load()?.is_empty() {
        store.save(&[])?;
    }

    println!("initialized blog in {}", blog_dir.display());
    Ok(())
}

pub async fn run_serve(console: &mut ServeConsole, config_path: &Path) -> Result<()> {
    let config = if config_path.exists() {
        BlogConfig::load(config_path)?
    } else {
        console.notice(Notice::Info(format!(
            "{} not found, using defaults",
            config_path.display()
        )))?;
        BlogConfig::default()
    };

    let store = JsonFileStore::new(&config.posts_file);
    // Surface a broken posts file before accepting requests.
    let count = store
        .load()
        .wrap_err("Could not read existing posts")?
        .len();
    let blog = BlogModule::with_markdown(store, &config)?;
    let state = Arc::new(AppState::new(blog));

    console.serving(Serving {
        address: format!("http://{}", config.address),
        posts_file: config.posts_file.display().to_string(),
        post_count: count,
    })?;
    serve(&config, state).await?;
    Ok(())
}
