pub mod config;
pub mod direction;
pub mod request;
pub mod request_queue;
