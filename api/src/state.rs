use std::sync::Arc;

use crack_core::game::SecretPhrase;
use crack_core::guard::GuardService;
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Shared persona pipeline; immutable, reused by every request
    pub guard: Arc<GuardService>,
    pub secret: Arc<SecretPhrase>,
}
