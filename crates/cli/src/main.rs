use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use sidenav_tui::sidebar::{DEFAULT_ROW_HEIGHT, DEFAULT_VIEWPORT_HEIGHT, ScrollSource, plain_lines};
use sidenav_tui::{BrowseOptions, Component, Effect, SidebarConfig, SidebarEvent, SidebarScrollbox};
use sidenav_types::{FoldConfig, Outline};
use sidenav_util::{JsonSessionStore, PathPrefix, SessionStore, path_to_root};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use url::Url;

#[derive(Debug, Parser)]
#[command(name = "sidenav", version, about = "Table-of-contents sidebar for statically generated books")]
struct Cli {
    /// Outline file (.json, .yaml, .yml) replacing the embedded book outline.
    #[arg(long, global = true)]
    outline: Option<PathBuf>,
    /// Session file shared between page loads (defaults to $SIDENAV_SESSION_PATH or the temp directory).
    #[arg(long, global = true)]
    session: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Load a page and print the resulting sidebar state.
    Resolve {
        #[command(flatten)]
        page: PageArgs,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Load a page, scroll the sidebar, and click one of its links.
    Click {
        #[command(flatten)]
        page: PageArgs,
        /// Outline target of the link to click (for example `setup.html`).
        #[arg(long)]
        link: String,
        /// Sidebar scroll offset at the time of the click.
        #[arg(long, default_value_t = 0)]
        scroll_top: u32,
    },
    /// Browse the book interactively in the terminal.
    Browse {
        /// Page opened first.
        #[arg(long)]
        url: Url,
        /// Directory URL of the book; defaults to the directory of `--url`.
        #[arg(long)]
        site_root: Option<Url>,
        /// Fold sections deeper than this level (enables section toggles).
        #[arg(long)]
        fold_level: Option<u32>,
    },
    /// Print the outline as JSON.
    Outline,
}

#[derive(Debug, Args)]
struct PageArgs {
    /// Browser location of the page being loaded.
    #[arg(long)]
    url: Url,
    /// Root-relative prefix of the page (for example `../`).
    #[arg(long, conflicts_with = "site_root")]
    path_to_root: Option<String>,
    /// Directory URL of the book; the prefix is derived from it when `--path-to-root` is absent.
    #[arg(long)]
    site_root: Option<Url>,
    /// Fold sections deeper than this level (enables section toggles).
    #[arg(long)]
    fold_level: Option<u32>,
    /// Sidebar viewport height in pixels.
    #[arg(long, default_value_t = DEFAULT_VIEWPORT_HEIGHT)]
    viewport_height: u32,
    /// Height of one sidebar row in pixels.
    #[arg(long, default_value_t = DEFAULT_ROW_HEIGHT)]
    row_height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Html,
}

impl PageArgs {
    fn prefix(&self) -> PathPrefix {
        match (&self.path_to_root, &self.site_root) {
            (Some(prefix), _) => PathPrefix::new(prefix.as_str()),
            (None, Some(site_root)) => path_to_root(site_root, &self.url),
            (None, None) => PathPrefix::default(),
        }
    }

    fn config(&self) -> SidebarConfig {
        SidebarConfig::new(self.url.clone(), self.prefix())
            .with_viewport_height(self.viewport_height)
            .with_row_height(self.row_height)
            .with_fold(fold_config(self.fold_level))
    }
}

fn fold_config(level: Option<u32>) -> FoldConfig {
    level.map(FoldConfig::folded).unwrap_or_default()
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(matches!(cli.command, Command::Browse { .. }));

    let outline = load_outline(cli.outline.as_ref())?;
    match cli.command {
        Command::Outline => {
            println!("{}", serde_json::to_string_pretty(&outline)?);
            Ok(())
        }
        Command::Resolve { page, format } => {
            let store = open_store(cli.session)?;
            let sidebar = attach(&page, outline, store)?;
            print_sidebar(&sidebar, format)
        }
        Command::Click { page, link, scroll_top } => {
            let store = open_store(cli.session)?;
            let mut sidebar = attach(&page, outline, store)?;
            let target = click(&mut sidebar, &link, scroll_top)?;
            println!("{target}");
            Ok(())
        }
        Command::Browse {
            url,
            site_root,
            fold_level,
        } => {
            let store = open_store(cli.session)?;
            let site_root = match site_root {
                Some(site_root) => site_root,
                None => url.join("./").context("cannot derive the site root from --url")?,
            };
            let options = BrowseOptions {
                location: url,
                site_root,
                outline,
                fold: fold_config(fold_level),
            };
            sidenav_tui::run(options, store)
        }
    }
}

/// Logs go to stderr; the interactive browser stays silent unless `RUST_LOG` asks otherwise.
fn init_tracing(interactive: bool) {
    let fallback = if interactive { "off" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_outline(path: Option<&PathBuf>) -> Result<Outline> {
    match path {
        Some(path) => Outline::from_path(path).with_context(|| format!("failed to load outline {}", path.display())),
        None => Outline::embedded().context("embedded outline is invalid"),
    }
}

fn open_store(path: Option<PathBuf>) -> Result<Arc<dyn SessionStore>> {
    let store = JsonSessionStore::new(path).context("failed to open session store")?;
    debug!(path = %store.path().display(), "opened session store");
    Ok(Arc::new(store))
}

fn attach(page: &PageArgs, outline: Outline, store: Arc<dyn SessionStore>) -> Result<SidebarScrollbox> {
    let mut sidebar = SidebarScrollbox::new(page.config(), outline, store);
    sidebar.connected()?;
    Ok(sidebar)
}

/// Scrolls to `scroll_top`, clicks the link with outline target `href`, and returns the navigation target.
fn click(sidebar: &mut SidebarScrollbox, href: &str, scroll_top: u32) -> Result<Url> {
    let (link, current) = {
        let state = sidebar.state().context("sidebar is not connected")?;
        let link = state
            .tree()
            .find_link(href)
            .with_context(|| format!("no sidebar link targets '{href}'"))?;
        (link, state.metrics().offset())
    };
    sidebar.handle_event(SidebarEvent::ScrollBy(i64::from(scroll_top) - i64::from(current)));
    match sidebar.handle_event(SidebarEvent::Activate(link)).into_iter().next() {
        Some(Effect::Navigate(target)) => Ok(target),
        None => bail!("link '{href}' does not resolve to a URL"),
    }
}

fn print_sidebar(sidebar: &SidebarScrollbox, format: OutputFormat) -> Result<()> {
    let state = sidebar.state().context("sidebar is not connected")?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&state.snapshot())?),
        OutputFormat::Html => println!("{}", state.tree().render_html()),
        OutputFormat::Text => {
            let snapshot = state.snapshot();
            let config = sidebar.config();
            println!("page:         {}", config.location);
            println!("path to root: {:?}", config.path_to_root.as_str());
            match &snapshot.active {
                Some(active) => println!("active:       {} ({})", active.label, active.href),
                None => println!("active:       none"),
            }
            let source = match snapshot.scroll_source {
                ScrollSource::Restored => "restored",
                ScrollSource::Centered => "centered",
                ScrollSource::None => "default",
            };
            println!("scroll top:   {} ({source})", snapshot.scroll_top);
            println!();
            for line in plain_lines(state) {
                println!("{line}");
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sidenav_util::MemorySessionStore;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("sidenav").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn prefix_prefers_explicit_value() {
        let cli = parse(&["resolve", "--url", "https://docs.example.com/book/a/b.html", "--path-to-root", "../"]);
        let Command::Resolve { page, .. } = cli.command else {
            panic!("expected resolve");
        };
        assert_eq!(page.prefix().as_str(), "../");
    }

    #[test]
    fn prefix_derives_from_site_root() {
        let cli = parse(&[
            "resolve",
            "--url",
            "https://docs.example.com/book/a/b/c.html",
            "--site-root",
            "https://docs.example.com/book/",
        ]);
        let Command::Resolve { page, .. } = cli.command else {
            panic!("expected resolve");
        };
        assert_eq!(page.prefix().as_str(), "../../");
    }

    #[test]
    fn prefix_and_site_root_conflict() {
        let result = Cli::try_parse_from([
            "sidenav",
            "resolve",
            "--url",
            "https://docs.example.com/a.html",
            "--path-to-root",
            "",
            "--site-root",
            "https://docs.example.com/",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn click_saves_offset_and_returns_target() {
        let cli = parse(&["click", "--url", "https://docs.example.com/book/introduction.html", "--link", "setup.html"]);
        let Command::Click { page, link, .. } = cli.command else {
            panic!("expected click");
        };
        let store = Arc::new(MemorySessionStore::new());
        let mut sidebar = attach(&page, Outline::embedded().unwrap(), store.clone()).unwrap();

        let target = click(&mut sidebar, &link, 120).unwrap();
        assert_eq!(target.as_str(), "https://docs.example.com/book/setup.html");
        assert_eq!(store.get(sidenav_util::SCROLL_KEY).unwrap().as_deref(), Some("120"));
        assert!(click(&mut sidebar, "missing.html", 0).is_err());
    }
}
