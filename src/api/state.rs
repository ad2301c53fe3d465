use std::sync::Arc;

use crate::{config::Settings, identity::IdentityProvider, service::ServiceContext};

#[derive(Clone)]
pub struct AppState {
    pub service_context: Arc<ServiceContext>,
    pub identity_provider: Arc<dyn IdentityProvider>,
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(
        service_context: Arc<ServiceContext>,
        identity_provider: Arc<dyn IdentityProvider>,
        settings: Arc<Settings>,
    ) -> Self {
        Self {
            service_context,
            identity_provider,
            settings,
        }
    }
}
