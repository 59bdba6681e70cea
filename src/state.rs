use crate::config::AppConfig;
use crate::store::DonorStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<DonorStore>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        Ok(Self::from_parts(Arc::new(DonorStore::new()), config))
    }

    pub fn from_parts(store: Arc<DonorStore>, config: Arc<AppConfig>) -> Self {
        Self { store, config }
    }

    /// Fresh empty store with fixed test credentials.
    #[cfg(test)]
    pub fn fake() -> Self {
        let config = Arc::new(AppConfig {
            host: "127.0.0.1".into(),
            port: 0,
            cors_origin: None,
            jwt: crate::config::JwtConfig {
                secret: "test".into(),
                issuer: "test-issuer".into(),
                audience: "test-aud".into(),
                ttl_minutes: 5,
                refresh_ttl_minutes: 60,
            },
        });
        Self::from_parts(Arc::new(DonorStore::new()), config)
    }
}
