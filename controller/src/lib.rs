pub mod debug;
pub mod dispatcher;
pub mod elevator;
pub mod logging;
pub mod sim;
pub mod stats;
pub mod strategy;
