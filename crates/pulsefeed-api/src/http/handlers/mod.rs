pub mod chat;
pub mod dashboard;
pub mod feed;
pub mod ws;
