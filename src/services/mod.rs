pub mod browse;
pub mod details;
pub mod favorites;
pub mod preferences;
pub mod ratings;
pub mod search;
pub mod session;
pub mod validation;

pub use browse::{BrowseScreen, Shelf};
pub use details::DetailsScreen;
pub use favorites::{FavoriteSort, FavoritesScreen, ToggleOutcome};
pub use search::{SearchFilters, SearchScreen};
pub use session::AuthSession;
