use std::sync::Arc;
use crate::domain::ports::UserRepository;
use crate::domain::services::{
    account_service::AccountService, auth_service::AuthService, booking_service::BookingService,
    catalog::CatalogService, notification_service::NotificationService,
    payment_service::PaymentService, review_service::ReviewService,
};
use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub user_repo: Arc<dyn UserRepository>,
    pub auth_service: Arc<AuthService>,
    pub account_service: Arc<AccountService>,
    pub catalog_service: Arc<CatalogService>,
    pub booking_service: Arc<BookingService>,
    pub payment_service: Arc<PaymentService>,
    pub review_service: Arc<ReviewService>,
    pub notification_service: Arc<NotificationService>,
}
