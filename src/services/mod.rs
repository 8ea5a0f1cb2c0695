pub mod events;
pub mod health_service;
pub mod notification;
pub mod rate_limit_service;
pub mod rsvp_service;
pub mod store;
pub mod validation;
