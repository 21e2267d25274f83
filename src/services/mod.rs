pub mod drive;
pub mod google_api;
pub mod google_auth;
pub mod sheets;
pub mod upload_service;
