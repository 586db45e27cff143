/// ----- SIMULATION MODULE -----
/// Demo request generator: submits a randomized request stream to the
/// dispatcher until the duration elapses or a stop signal arrives.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::{select, Receiver};
use rand::Rng;

use crate::dispatcher::Dispatcher;
use crate::log_event;

pub fn main(
    dispatcher: Arc<Dispatcher>,
    num_floors: u8,
    duration: Duration,
    stop_rx: Receiver<bool>,
) {
    let mut rng = rand::rng();
    let deadline = Instant::now() + duration;
    let mut generated: u32 = 0;

    while Instant::now() < deadline {
        let pause = Duration::from_millis(rng.random_range(500..1500));
        select! {
            recv(stop_rx) -> _ => break,
            default(pause) => {
                let from = rng.random_range(1..=num_floors);
                let mut to = rng.random_range(1..=num_floors);
                while to == from {
                    to = rng.random_range(1..=num_floors);
                }
                let roll: f64 = rng.random();
                if roll < 0.05 {
                    dispatcher.submit_emergency(from, to);
                } else if roll < 0.15 {
                    dispatcher.submit_priority(from, to);
                } else {
                    dispatcher.submit_call(from, to);
                }
                generated += 1;
            },
        }
    }

    log_event!("request generator finished, {} requests submitted", generated);
}
