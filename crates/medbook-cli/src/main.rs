use std::sync::Arc;

use clap::{Parser, ValueEnum};
use medbook_api::{CountriesClient, CoversClient, GeoIpClient, OpenLibraryClient};
use medbook_core::{
    Accounts, Book, BookmarkSync, Config, CountryOnboarding, SearchController, SortBy,
};
use medbook_store::LocalStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "medbook")]
#[command(version, about = "Book search and bookmarks over OpenLibrary", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Search books by title
    Search {
        /// Title query (minimum 3 characters to hit the network)
        query: String,
        /// Number of pages to fetch
        #[arg(long, default_value_t = 1)]
        pages: usize,
        /// Sort the accumulated results
        #[arg(long, value_enum, default_value_t = SortArg::None)]
        sort: SortArg,
        /// Annotate results with bookmark state for this account
        #[arg(long)]
        email: Option<String>,
        /// Bookmark the n-th displayed result (1-based, needs --email)
        #[arg(long)]
        save: Option<usize>,
    },
    /// List saved bookmarks
    Bookmarks {
        /// Owner account email
        #[arg(long)]
        email: String,
    },
    /// Remove a saved bookmark by title
    Unbookmark {
        #[arg(long)]
        email: String,
        #[arg(long)]
        title: String,
    },
    /// Create an account (runs country onboarding)
    Signup {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Log into an existing account
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Log out of an account
    Logout {
        #[arg(long)]
        email: String,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SortArg {
    None,
    Title,
    Average,
    Hits,
}

impl From<SortArg> for SortBy {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::None => SortBy::None,
            SortArg::Title => SortBy::Title,
            SortArg::Average => SortBy::Average,
            SortArg::Hits => SortBy::Hits,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging - helps when things go sideways
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "medbook=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;
    let db_path = config.store.resolved_db_path()?;
    let store = Arc::new(LocalStore::new(&db_path.to_string_lossy())?);
    tracing::debug!("Using store at {}", db_path.display());

    match cli.command {
        Commands::Search {
            query,
            pages,
            sort,
            email,
            save,
        } => {
            let searcher = Arc::new(OpenLibraryClient::with_base_url(
                config.api.search_url.clone(),
            ));
            let mut controller = SearchController::new(searcher);

            controller.set_query(&query).await?;
            for _ in 1..pages {
                if controller.is_exhausted() {
                    break;
                }
                controller.load_more().await?;
            }

            let sync = email.as_ref().map(|email| {
                BookmarkSync::new(
                    Arc::clone(&store),
                    Arc::new(CoversClient::with_base_url(config.api.covers_url.clone())),
                    email.clone(),
                )
            });

            let books = controller.sorted(sort.into());
            if books.is_empty() {
                println!("No results for '{}'", query);
            }
            for (index, book) in books.iter().enumerate() {
                let marker = match &sync {
                    Some(sync) if sync.is_bookmarked(book) => "*",
                    _ => " ",
                };
                println!("{:>3}. {} {}", index + 1, marker, format_book(book));
            }
            if controller.is_exhausted() {
                println!("(end of results)");
            }

            if let Some(n) = save {
                let Some(sync) = &sync else {
                    anyhow::bail!("--save needs --email");
                };
                let book = books
                    .get(n.saturating_sub(1))
                    .ok_or_else(|| anyhow::anyhow!("No result #{}", n))?;
                sync.toggle(book, true)?;
                println!("Bookmarked '{}'", book.title);
            }
        }
        Commands::Bookmarks { email } => {
            let books: Vec<Book> = store.list_bookmarks(&email)?;
            if books.is_empty() {
                println!("No bookmarks for {}", email);
            }
            for book in &books {
                println!("  {}", format_book(book));
            }
        }
        Commands::Unbookmark { email, title } => {
            store.delete_bookmark(&title, &email)?;
            println!("Removed '{}' for {}", title, email);
        }
        Commands::Signup { email, password } => {
            let accounts = Accounts::new(Arc::clone(&store));
            let user = accounts.sign_up(&email, &password)?;

            let onboarding = CountryOnboarding::new(
                Arc::clone(&store),
                CountriesClient::with_url(config.api.countries_url.clone()),
                GeoIpClient::with_url(config.api.geoip_url.clone()),
            );
            let setup = onboarding.ensure_country_setup().await?;

            println!(
                "Welcome {}! Default country: {} ({} in the list)",
                user.email,
                setup.selected,
                setup.countries.len()
            );
        }
        Commands::Login { email, password } => {
            let accounts = Accounts::new(Arc::clone(&store));
            let user = accounts.log_in(&email, &password)?;
            println!("Logged in as {}", user.email);
        }
        Commands::Logout { email } => {
            let accounts = Accounts::new(Arc::clone(&store));
            accounts.log_out(&email)?;
            println!("Logged out {}", email);
        }
    }

    Ok(())
}

fn format_book(book: &Book) -> String {
    format!(
        "{} by {} ({:.1} avg, {} ratings)",
        book.title,
        book.author_display(),
        book.ratings_average.unwrap_or(0.0),
        book.ratings_count.unwrap_or(0)
    )
}
