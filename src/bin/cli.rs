//! Story search CLI
//!
//! Command-line front end over the story API client.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use story_search::{
    config,
    error::{AppError, Result},
    feed::{FeedLoader, header},
    models::{
        FeedConfig, LoggingConfig, PaginationQuery, Route, SortOrder, Story, StoryPatch, StoryPayload, TagFilter,
        param,
    },
    query::{MutationHandle, QueryClient},
    storage::TokenStore,
    utils::params::SearchParams,
};

/// story - browse and edit stories from the terminal
#[derive(Parser, Debug)]
#[command(name = "story", version, about = "Story search API client")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "story.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Row template ({id}, {title}, {author}, {username}, {likes}, {tags}, {created})
    #[arg(long, default_value = "{id}\t{title} by {author} ({likes} likes)")]
    format: String,

    #[command(subcommand)]
    command: Command,
}

/// List filters shared by `search` and `feed`.
#[derive(clap::Args, Debug)]
struct Filters {
    /// Only stories with this tag ("all" for every tag)
    #[arg(long)]
    tag: Option<String>,

    /// Sort direction: asc or desc
    #[arg(long)]
    sort: Option<String>,

    /// Field to sort by
    #[arg(long)]
    order_by: Option<String>,
}

impl Filters {
    fn apply(&self, params: &mut SearchParams) {
        if let Some(tag) = &self.tag {
            header::set_tag(params, &TagFilter::parse(tag));
        }
        if let Some(sort) = &self.sort {
            header::set_sort_order(params, SortOrder::parse(sort));
        }
        if let Some(field) = &self.order_by {
            header::set_order_by(params, field);
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search stories by title and description
    Search {
        text: String,

        #[command(flatten)]
        filters: Filters,

        #[arg(long, default_value_t = 1)]
        page: u32,
    },

    /// Scroll through the feed
    Feed {
        /// Free-text filter
        #[arg(long)]
        search: Option<String>,

        #[command(flatten)]
        filters: Filters,

        /// Number of pages to load
        #[arg(long, default_value_t = 1)]
        pages: u32,
    },

    /// Show one story and whether you like it
    Show { id: String },

    /// List stories written by a user
    Author { username: String },

    /// Create a story
    Create {
        title: String,
        description: String,

        #[arg(long = "tag")]
        tags: Vec<String>,
    },

    /// Update fields of a story
    Update {
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        description: Option<String>,

        /// Replace the tag list
        #[arg(long = "tag")]
        tags: Vec<String>,
    },

    /// Delete a story
    Delete { id: String },

    /// Toggle your like on a story
    Like { id: String },

    /// Expand a title and idea into a full story
    Generate { title: String, description: String },

    /// Summarize a description
    Summarize { description: String },

    /// Resolve a client path to its route
    Route { path: String },

    /// Validate the configuration
    Validate,

    /// Store the bearer token used for requests
    Login { token: String },

    /// Remove the stored bearer token
    Logout,
}

/// Initialize logging with `level` as the default filter.
fn init_logging(level: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn print_stories(stories: &[Story], template: &str) {
    if stories.is_empty() {
        log::info!("No stories found.");
    }
    for story in stories {
        println!("{}", story.format(template));
    }
}

async fn run_feed(
    client: Arc<QueryClient>,
    params: &SearchParams,
    page_size: u32,
    pages: u32,
    template: &str,
) -> Result<()> {
    let feed_config = FeedConfig { page_size };
    let mut loader = FeedLoader::new(client, params, &feed_config);
    loader.sync(params).await?;

    for _ in 1..pages {
        if !loader.load_more().await? {
            break;
        }
    }

    print_stories(loader.feed().items(), template);
    if !loader.feed().has_more() {
        log::info!("End of feed.");
    }
    Ok(())
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let loaded = config::load_config(&cli.config);
    let fallback = LoggingConfig::default();
    let logging = loaded.as_ref().map_or(&fallback, |config| &config.logging);
    init_logging(logging.filter(cli.verbose));

    let config = loaded?;
    let tokens = config::token_store(&config);
    let client = Arc::new(config::connect(&config)?);
    let template = cli.format.as_str();

    match cli.command {
        Command::Search {
            text,
            filters,
            page,
        } => {
            let mut params = SearchParams::new();
            params.set(param::SEARCH, text);
            filters.apply(&mut params);
            let query = PaginationQuery::from_params(&params, page, config.search.per_page);

            let stories = client.list_stories(&query, true).await.into_result()?;
            print_stories(&stories.unwrap_or_default(), template);
        }

        Command::Feed {
            search,
            filters,
            pages,
        } => {
            let mut params = SearchParams::new();
            if let Some(text) = search {
                params.set(param::SEARCH, text);
            }
            filters.apply(&mut params);
            run_feed(client, &params, config.feed.page_size, pages.max(1), template).await?;
        }

        Command::Show { id } => {
            let (story, like) = client.story_detail(&id).await;
            let Some(story) = story.into_result()? else {
                return Err(AppError::validation("story id must not be empty"));
            };
            println!("{}", story.format(template));
            println!("{}", story.description);
            if let Some(summary) = &story.summary {
                println!("Summary: {summary}");
            }
            match like.into_result() {
                Ok(Some(status)) => println!("Liked: {}", if status.liked { "yes" } else { "no" }),
                Ok(None) => {}
                Err(e) => log::warn!("Could not check like status: {}", e),
            }
        }

        Command::Author { username } => {
            let stories = client.stories_by_author(&username).await.into_result()?;
            print_stories(&stories.unwrap_or_default(), template);
        }

        Command::Create {
            title,
            description,
            tags,
        } => {
            let story = client
                .create_story(&StoryPayload::new(title, description, tags))
                .await?;
            println!("{}", story.format(template));
        }

        Command::Update {
            id,
            title,
            description,
            tags,
        } => {
            let mut patch = StoryPatch::default();
            if let Some(title) = title {
                patch = patch.title(title);
            }
            if let Some(description) = description {
                patch = patch.description(description);
            }
            if !tags.is_empty() {
                patch = patch.tags(tags);
            }
            if patch.is_empty() {
                return Err(AppError::validation("nothing to update"));
            }

            let handle = MutationHandle::new();
            let story = handle.run(client.update_story(&id, &patch)).await?;
            println!("{}", story.format(template));
        }

        Command::Delete { id } => {
            client.delete_story(&id).await?;
            log::info!("Deleted story {}", id);
        }

        Command::Like { id } => {
            client.toggle_like(&id).await?;
            if let Some(status) = client.check_like(&id).await.into_result()? {
                println!("Liked: {}", if status.liked { "yes" } else { "no" });
            }
        }

        Command::Generate { title, description } => {
            let generated = client.generate(&title, &description).await?;
            println!("{}\n\n{}", generated.title, generated.description);
        }

        Command::Summarize { description } => {
            let summary = client.summarize(&description).await?;
            println!("{}", summary.summary);
        }

        Command::Route { path } => {
            let route = Route::parse(&path);
            match route.status_code() {
                Some(code) => println!("{route} ({code})"),
                None => println!("{route}"),
            }
        }

        Command::Validate => {
            log::info!("Validating configuration...");
            log::info!("✓ API base URL: {}", config.api.base_url);
            log::info!("✓ Resource: {}", config.api.resource);
            log::info!("✓ Token file: {}", config.auth.token_file.display());
            log::info!("All validations passed!");
        }

        Command::Login { token } => {
            tokens.save_token(&token).await?;
            log::info!("Token saved to {}", tokens.path().display());
        }

        Command::Logout => {
            tokens.clear_token().await?;
            log::info!("Logged out.");
        }
    }

    Ok(())
}
