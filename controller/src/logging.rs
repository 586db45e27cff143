/// ----- LOGGING MODULE -----
/// Timestamped event log for units and the dispatcher.

use std::thread;
use std::time::{SystemTime, UNIX_EPOCH};

pub fn log(message: &str) {
    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis())
        .unwrap_or(0);
    let current = thread::current();
    let thread_name = current.name().unwrap_or("main");
    println!("[{ts}ms] [{thread_name}] {message}");
}

#[macro_export]
macro_rules! log_event {
    ($($arg:tt)*) => {
        $crate::logging::log(&format!($($arg)*))
    };
}
