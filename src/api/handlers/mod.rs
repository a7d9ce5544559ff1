pub mod admin;
pub mod auth;
pub mod booking;
pub mod category;
pub mod event;
pub mod health;
pub mod notification;
pub mod payment;
pub mod review;
pub mod user;
