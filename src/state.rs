use crate::config::Config;
use crate::store::Store;
use crate::utils::sign_in::PendingSignIns;
use axum::extract::FromRef;

#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub config: Config,
    pub sign_ins: PendingSignIns,
}

impl AppState {
    pub fn new(store: Store, config: Config) -> Self {
        let sign_ins = PendingSignIns::new(config.redirect_ttl);
        Self {
            store,
            config,
            sign_ins,
        }
    }
}

impl FromRef<AppState> for Store {
    fn from_ref(state: &AppState) -> Self {
        state.store.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl FromRef<AppState> for PendingSignIns {
    fn from_ref(state: &AppState) -> Self {
        state.sign_ins.clone()
    }
}
