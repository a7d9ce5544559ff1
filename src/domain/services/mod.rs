pub mod account_service;
pub mod auth_service;
pub mod booking_policy;
pub mod booking_service;
pub mod catalog;
pub mod notification_service;
pub mod payment_service;
pub mod review_service;
