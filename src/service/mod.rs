pub mod admin_service;
pub mod class_service;
pub mod client_service;
pub mod group_service;
pub mod payment_service;
pub mod reconcile;

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::repository::*;

pub use admin_service::AdminService;
pub use class_service::ClassService;
pub use client_service::ClientService;
pub use group_service::GroupService;
pub use payment_service::PaymentService;

pub struct ServiceContext {
    pub client_service: Arc<ClientService>,
    pub admin_service: Arc<AdminService>,
    pub class_service: Arc<ClassService>,
    pub group_service: Arc<GroupService>,
    pub payment_service: Arc<PaymentService>,
    pub admin_repo: Arc<dyn AdminRepository>,
    pub db_pool: SqlitePool,
}

impl ServiceContext {
    pub fn new(
        client_repo: Arc<dyn ClientRepository>,
        admin_repo: Arc<dyn AdminRepository>,
        class_repo: Arc<dyn ClassSessionRepository>,
        group_repo: Arc<dyn ClientGroupRepository>,
        payment_repo: Arc<dyn PaymentRepository>,
        db_pool: SqlitePool,
    ) -> Self {
        let client_service = Arc::new(ClientService::new(client_repo.clone()));
        let admin_service = Arc::new(AdminService::new(admin_repo.clone()));
        let class_service = Arc::new(ClassService::new(
            class_repo,
            client_repo.clone(),
            admin_repo.clone(),
        ));
        let group_service = Arc::new(GroupService::new(group_repo, client_repo.clone()));
        let payment_service = Arc::new(PaymentService::new(payment_repo, client_repo));

        Self {
            client_service,
            admin_service,
            class_service,
            group_service,
            payment_service,
            admin_repo,
            db_pool,
        }
    }
}
