use crate::{
    client::BookApi,
    error::{AppError, AppResult},
    services::session::AuthSession,
};

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

/// Rates a book for the signed-in user
///
/// Fails without a request when signed out or when the rating is out of
/// range. A rejected token logs the session out.
pub async fn rate_book(
    api: &dyn BookApi,
    session: &mut AuthSession,
    title: &str,
    rating: u8,
) -> AppResult<()> {
    let Some(token) = session.token().map(str::to_string) else {
        return Err(AppError::InvalidInput("Please login to rate books".to_string()));
    };

    if !(MIN_RATING..=MAX_RATING).contains(&rating) {
        return Err(AppError::InvalidInput(format!(
            "Rating must be between {} and {}",
            MIN_RATING, MAX_RATING
        )));
    }

    if title.trim().is_empty() {
        return Err(AppError::InvalidInput("Book title is required".to_string()));
    }

    match api.rate(&token, title, rating).await {
        Ok(()) => Ok(()),
        Err(e) if e.is_unauthorized() => {
            session.expire().await;
            Err(e)
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MockBookApi;
    use crate::storage::Storage;
    use std::sync::Arc;

    async fn session(signed_in: bool) -> (tempfile::TempDir, AuthSession) {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::open(dir.path()).unwrap();
        if signed_in {
            storage.set_auth_token("tok").await.unwrap();
        }
        let session = AuthSession::restore(Arc::new(MockBookApi::new()), storage).await;
        (dir, session)
    }

    #[tokio::test]
    async fn test_rate_requires_login() {
        let mut api = MockBookApi::new();
        api.expect_rate().never();
        let (_dir, mut session) = session(false).await;

        let err = rate_book(&api, &mut session, "Dune", 5).await.unwrap_err();
        assert_eq!(err.user_message(""), "Please login to rate books");
    }

    #[tokio::test]
    async fn test_rate_out_of_range() {
        let mut api = MockBookApi::new();
        api.expect_rate().never();
        let (_dir, mut session) = session(true).await;

        for rating in [0, 6] {
            let err = rate_book(&api, &mut session, "Dune", rating).await.unwrap_err();
            assert_eq!(err.user_message(""), "Rating must be between 1 and 5");
        }
    }

    #[tokio::test]
    async fn test_rate_success() {
        let mut api = MockBookApi::new();
        api.expect_rate()
            .withf(|token, title, rating| token == "tok" && title == "Dune" && *rating == 4)
            .times(1)
            .returning(|_, _, _| Ok(()));
        let (_dir, mut session) = session(true).await;

        tokio_test::assert_ok!(rate_book(&api, &mut session, "Dune", 4).await);
    }

    #[tokio::test]
    async fn test_rate_unauthorized_expires_session() {
        let mut api = MockBookApi::new();
        api.expect_rate()
            .returning(|_, _, _| Err(AppError::Unauthorized("Invalid or expired token".to_string())));
        let (_dir, mut session) = session(true).await;

        tokio_test::assert_err!(rate_book(&api, &mut session, "Dune", 3).await);
        assert!(!session.is_authenticated());
    }
}
