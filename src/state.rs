use crate::config::Config;
use crate::store::UserRepository;
use axum::extract::FromRef;

/// Shared application context, built once in `main` and cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub repo: UserRepository,
    pub config: Config,
}

impl FromRef<AppState> for UserRepository {
    fn from_ref(state: &AppState) -> Self {
        state.repo.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
