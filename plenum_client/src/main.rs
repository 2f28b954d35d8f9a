use std::thread;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;

use plenum_client::app::process_messages;
use plenum_client::render;
use plenum_client::{ApiClient, ClientConfig, IdeaPage};
use plenum_core::view::{DisplayPolicy, PostsFilter};

/// Terminal viewer for deliberation threads.
#[derive(Parser)]
#[command(name = "plenum", version)]
struct Cli {
    /// Base URL of the GraphQL collaborator; falls back to PLENUM_API_URL.
    #[arg(long)]
    api_url: Option<String>,

    /// Idea whose discussion thread to display.
    #[arg(long)]
    idea: String,

    /// Content locale for post bodies; falls back to PLENUM_LANG.
    #[arg(long)]
    lang: Option<String>,

    /// Deep-link to a post: its branch is expanded on load.
    #[arg(long)]
    post: Option<String>,

    /// Show the whole thread expanded instead of folded summaries.
    #[arg(long)]
    expand_all: bool,

    /// Re-fetch and re-render every N seconds.
    #[arg(long, value_name = "SECONDS")]
    watch: Option<u64>,

    /// Text width for HTML bodies.
    #[arg(long, default_value_t = 100)]
    width: usize,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let config = ClientConfig::from_env();

    let api_url = cli.api_url.unwrap_or(config.api_url);
    let lang = cli.lang.unwrap_or(config.lang);

    let api = ApiClient::new(api_url)?;
    let mut page = IdeaPage::new(api, cli.idea, &lang);
    if cli.expand_all {
        page.state.thread_view.set_filter(PostsFilter {
            display: DisplayPolicy::Full,
            ..PostsFilter::default()
        });
    }
    page.state.pending_scroll_target = cli.post;
    page.spawn_load_idea();

    loop {
        process_messages(&mut page);
        if page.state.is_loading {
            thread::sleep(Duration::from_millis(50));
            continue;
        }

        let rendered = render::render_page(&page.state, cli.width);
        print!("{}", rendered.text);
        if let Some(positions) = page.pump_layout(&rendered.metrics) {
            print!(
                "{}",
                render::render_nugget_gutter(&positions, page.state.nuggets.overlays())
            );
        }

        match cli.watch {
            Some(seconds) => {
                thread::sleep(Duration::from_secs(seconds.max(1)));
                page.refetch();
            }
            None => break,
        }
    }

    Ok(())
}
