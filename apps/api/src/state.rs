use std::sync::Arc;

use crate::auth::IdentityStore;
use crate::gateway::MatchIntel;
use crate::history::HistoryArchive;
use crate::matching::progress::ProgressChannel;
use crate::matching::session::SharedSession;
use crate::optimize::OptimizationRegistry;
use crate::profile::ProfileStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Pluggable gateway to the language model. Production: `LlmGateway`;
    /// tests swap in a stub.
    pub intel: Arc<dyn MatchIntel>,
    pub profile: Arc<ProfileStore>,
    /// The single live match session.
    pub session: SharedSession,
    pub optimizations: OptimizationRegistry,
    pub history: Arc<HistoryArchive>,
    pub identity: Arc<IdentityStore>,
    /// Phase-transition narration side channel.
    pub progress: ProgressChannel,
}
