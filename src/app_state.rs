use crate::config::Config;
use crate::store::DocumentStore;

#[derive(Clone)]
pub struct AppState {
    pub store: DocumentStore,
    pub config: Config,
}
