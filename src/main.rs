use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use bookquest::{
    client::{BookApi, HttpBookApi},
    config::Config,
    models::{Book, Favorite, RecommendationMode, SignupForm},
    routes::{guard, RouteDecision},
    services::{
        details::DetailsScreen,
        favorites::{FavoriteSort, FavoritesScreen, ToggleOutcome},
        preferences::{apply_preferences, update_preferences, PreferenceUpdate},
        ratings::rate_book,
        AuthSession, BrowseScreen, SearchFilters, SearchScreen,
    },
    storage::Storage,
};

/// Terminal client for the BookQuest recommendation backend
#[derive(Parser)]
#[command(name = "bookquest", version, about = "Book recommendations from the terminal")]
struct Cli {
    /// Backend base URL (overrides BOOKQUEST_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Where the session cookie and local storage live (overrides BOOKQUEST_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the backend is up and its model is loaded
    Health,

    /// Create an account and sign in
    Signup {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        confirm_password: String,
    },

    /// Sign in with an existing account
    Login {
        username: String,
        #[arg(long)]
        password: String,
    },

    /// Sign out and forget the stored session
    Logout,

    /// Show the signed-in user
    Whoami,

    /// Get recommendations for a title, genre, or author
    Search {
        query: String,

        /// `title`, `genre`, `author`, or `hybrid`; defaults to the saved preference
        #[arg(long)]
        mode: Option<RecommendationMode>,

        #[arg(long)]
        min_rating: Option<f64>,

        #[arg(long)]
        max_rating: Option<f64>,

        /// Only show books whose genre contains this text
        #[arg(long)]
        genre: Option<String>,

        /// Only show books whose author contains this text
        #[arg(long)]
        author: Option<String>,
    },

    /// Browse shelves and catalog listings
    Browse {
        #[command(subcommand)]
        shelf: BrowseCommand,
    },

    /// Show extended metadata for a title
    Details { title: String },

    /// Manage favorites (requires login)
    Favorites {
        #[command(subcommand)]
        action: FavoritesCommand,
    },

    /// Rate a book from 1 to 5 (requires login)
    Rate { title: String, rating: u8 },

    /// Recent searches
    History {
        #[command(subcommand)]
        action: HistoryCommand,
    },

    /// Saved search preferences
    Prefs {
        #[command(subcommand)]
        action: PrefsCommand,
    },
}

#[derive(Subcommand)]
enum BrowseCommand {
    Popular,
    Random,
    Genre { genre: String },
    /// List known genres
    Genres,
    /// List known authors
    Authors,
}

#[derive(Subcommand)]
enum FavoritesCommand {
    List {
        /// `recent`, `title`, `author`, or `rating`
        #[arg(long, default_value = "recent")]
        sort: FavoriteSort,

        /// Case-insensitive match on title or author
        #[arg(long)]
        search: Option<String>,
    },
    /// Add the book if absent, remove it if present
    Toggle {
        title: String,
        #[arg(long, default_value = "Unknown")]
        author: String,
        #[arg(long, default_value = "")]
        image: String,
        #[arg(long)]
        rating: Option<f64>,
    },
}

impl FavoritesCommand {
    /// Page the guard checks first
    ///
    /// Toggling is left to the favorites screen, which answers a signed-out
    /// user with its own login prompt.
    fn guarded_path(&self) -> Option<&'static str> {
        match self {
            FavoritesCommand::List { .. } => Some("/favorites"),
            FavoritesCommand::Toggle { .. } => None,
        }
    }
}

#[derive(Subcommand)]
enum HistoryCommand {
    List,
    Clear,
}

#[derive(Subcommand)]
enum PrefsCommand {
    Show,
    Set {
        #[arg(long = "add-genre")]
        add_genres: Vec<String>,
        #[arg(long = "remove-genre")]
        remove_genres: Vec<String>,
        #[arg(long)]
        mode: Option<RecommendationMode>,
        #[arg(long)]
        min_rating: Option<f64>,
        #[arg(long, conflicts_with = "min_rating")]
        clear_min_rating: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("bookquest=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = Config::from_env()?;
    if let Some(api_url) = cli.api_url {
        config.api_url = api_url;
    }
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }

    let api: Arc<dyn BookApi> = Arc::new(HttpBookApi::new(&config)?);
    let storage = Storage::open(&config.data_dir)
        .with_context(|| format!("Failed to open {}", config.data_dir.display()))?;

    tracing::debug!(backend = api.name(), data_dir = %config.data_dir.display(), "Starting");

    let mut session = AuthSession::restore(api.clone(), storage.clone()).await;
    if !matches!(cli.command, Commands::Health) {
        session.validate().await;
    }

    match cli.command {
        Commands::Health => health(api.as_ref()).await?,
        Commands::Signup {
            username,
            email,
            password,
            confirm_password,
        } => {
            if redirected("/signup", &session) {
                return Ok(());
            }
            let form = SignupForm {
                username,
                email,
                password,
                confirm_password,
            };
            match session.signup(&form).await {
                Ok(user) => println!("Welcome, {}!", user.username),
                Err(e) => println!("{}", e.user_message("Signup failed")),
            }
        }
        Commands::Login { username, password } => {
            if redirected("/login", &session) {
                return Ok(());
            }
            match session.login(&username, &password).await {
                Ok(user) => println!("Logged in as {}", user.username),
                Err(e) => println!("{}", e.user_message("Login failed")),
            }
        }
        Commands::Logout => {
            session.logout().await?;
            println!("Logged out");
        }
        Commands::Whoami => {
            if redirected("/profile", &session) {
                return Ok(());
            }
            if let Some(user) = session.user() {
                println!("{} (id {})", user.username, user.id);
                if !user.email.is_empty() {
                    println!("{}", user.email);
                }
            }
        }
        Commands::Search {
            query,
            mode,
            min_rating,
            max_rating,
            genre,
            author,
        } => {
            let prefs = storage.preferences().await;
            let filters = SearchFilters {
                min_rating,
                max_rating,
                genre,
                author,
            };
            let (mode, filters) = apply_preferences(&prefs, mode, filters);

            let mut screen = SearchScreen::new(api.clone(), storage.clone());
            let books = screen.search(&query, mode, filters).await.to_vec();
            if let Some(warning) = &screen.warning {
                println!("{}", warning);
            }
            print_books(&books);
            if let Some(message) = &screen.message {
                println!("{}", message);
            }
        }
        Commands::Browse { shelf } => browse(api.clone(), shelf).await,
        Commands::Details { title } => {
            let mut screen = DetailsScreen::new(api.clone());
            let book = Book::new(title, "Unknown", 0.0);
            if let Some(details) = screen.open(book).await {
                println!("{}", details.title);
                if !details.authors.is_empty() {
                    println!("by {}", details.authors.join(", "));
                }
                if let Some(rating) = details.average_rating {
                    println!(
                        "Rating: {:.1} ({} ratings)",
                        rating,
                        details.ratings_count.unwrap_or(0)
                    );
                }
                if let Some(pages) = details.page_count {
                    println!("Pages: {}", pages);
                }
                if let Some(published) = &details.published_date {
                    println!("Published: {}", published);
                }
                if !details.categories.is_empty() {
                    println!("Categories: {}", details.categories.join(", "));
                }
                if let Some(description) = &details.description {
                    println!("\n{}", description);
                }
            }
            if let Some(message) = &screen.message {
                println!("{}", message);
            }
            if let Some(cover) = screen.cover() {
                println!("Cover: {}", cover);
            }
        }
        Commands::Favorites { action } => {
            if let Some(path) = action.guarded_path() {
                if redirected(path, &session) {
                    return Ok(());
                }
            }
            favorites(api.clone(), &mut session, action).await;
        }
        Commands::Rate { title, rating } => {
            match rate_book(api.as_ref(), &mut session, &title, rating).await {
                Ok(()) => println!("Rated {} {}/5", title, rating),
                Err(e) => println!("{}", e.user_message("Failed to save rating")),
            }
        }
        Commands::History { action } => match action {
            HistoryCommand::List => {
                for query in storage.recent_searches().await {
                    println!("{}", query);
                }
            }
            HistoryCommand::Clear => {
                storage.clear_recent_searches().await?;
                println!("Search history cleared");
            }
        },
        Commands::Prefs { action } => {
            let mut prefs = storage.preferences().await;
            if let PrefsCommand::Set {
                add_genres,
                remove_genres,
                mode,
                min_rating,
                clear_min_rating,
            } = action
            {
                let update = PreferenceUpdate {
                    add_genres,
                    remove_genres,
                    preferred_mode: mode,
                    min_rating,
                    clear_min_rating,
                };
                update_preferences(&mut prefs, &update);
                storage.set_preferences(&prefs).await?;
            }
            println!("Mode: {}", prefs.preferred_mode);
            println!(
                "Minimum rating: {}",
                prefs
                    .min_rating
                    .map(|r| r.to_string())
                    .unwrap_or_else(|| "none".to_string())
            );
            println!("Genres: {}", prefs.favorite_genres.join(", "));
        }
    }

    Ok(())
}

/// Prints where the guard sends the user, if anywhere
fn redirected(path: &str, session: &AuthSession) -> bool {
    match guard(path, session.is_authenticated()) {
        RouteDecision::Allow => false,
        RouteDecision::Redirect(target) if target == "/" => {
            let name = session.user().map(|u| u.username.as_str()).unwrap_or("");
            println!("Already logged in as {}", name);
            true
        }
        RouteDecision::Redirect(target) => {
            println!("Please login first ({})", target);
            true
        }
    }
}

async fn health(api: &dyn BookApi) -> anyhow::Result<()> {
    let status = api.health().await.context("Backend unreachable")?;
    println!(
        "{} (model loaded: {}, {} books)",
        status.status, status.model_loaded, status.data_size
    );
    if let Some(error) = &status.error {
        println!("{}", error);
    }
    if !status.is_healthy() {
        anyhow::bail!("Backend is not healthy");
    }
    Ok(())
}

async fn browse(api: Arc<dyn BookApi>, shelf: BrowseCommand) {
    let mut screen = BrowseScreen::new(api);
    match shelf {
        BrowseCommand::Popular => print_books(screen.popular().await),
        BrowseCommand::Random => print_books(screen.random().await),
        BrowseCommand::Genre { genre } => print_books(screen.by_genre(&genre).await),
        BrowseCommand::Genres => {
            for genre in screen.load_genres().await {
                match genre.book_count {
                    Some(count) => println!("{} ({})", genre.name, count),
                    None => println!("{}", genre.name),
                }
            }
        }
        BrowseCommand::Authors => {
            for author in screen.load_authors().await {
                match author.book_count {
                    Some(count) => println!("{} ({})", author.name, count),
                    None => println!("{}", author.name),
                }
            }
        }
    }
    if let Some(message) = &screen.message {
        println!("{}", message);
    }
}

async fn favorites(api: Arc<dyn BookApi>, session: &mut AuthSession, action: FavoritesCommand) {
    let mut screen = FavoritesScreen::new(api);
    screen.load(session).await;
    if let Some(message) = &screen.message {
        println!("{}", message);
        return;
    }

    match action {
        FavoritesCommand::List { sort, search } => {
            let favorites = screen.view(sort, search.as_deref());
            if favorites.is_empty() {
                println!("No favorites yet");
            }
            for favorite in &favorites {
                print_favorite(favorite);
            }
        }
        FavoritesCommand::Toggle {
            title,
            author,
            image,
            rating,
        } => {
            let book = Book::new(title, author, rating.unwrap_or(0.0)).with_image(image);
            match screen.toggle(session, &book).await {
                ToggleOutcome::Added => println!("Added {} to favorites", book.title),
                ToggleOutcome::Removed => println!("Removed {} from favorites", book.title),
                ToggleOutcome::Rejected => {
                    if let Some(message) = &screen.message {
                        println!("{}", message);
                    }
                }
            }
        }
    }
}

fn print_books(books: &[Book]) {
    for (i, book) in books.iter().enumerate() {
        print!("{:>2}. {} by {} ({:.1})", i + 1, book.title, book.author, book.rating);
        if let Some(genre) = &book.genre {
            print!(" [{}]", genre);
        }
        println!();
        if let Some(reason) = &book.recommendation_reason {
            println!("    {}", reason);
        }
    }
}

fn print_favorite(favorite: &Favorite) {
    match favorite.rating {
        Some(rating) => println!("{} by {} ({:.1})", favorite.title, favorite.author, rating),
        None => println!("{} by {}", favorite.title, favorite.author),
    }
}
