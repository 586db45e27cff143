/// ----- DISPATCHER MODULE -----
/// Central controller: owns the fixed unit registry and the global inbound
/// priority queue. A single background loop pops the highest-priority
/// request, validates it and routes it to the unit with the lowest score
/// under the configured strategy.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use shared_resources::request::{Request, RequestFactory, RequestKind};
use shared_resources::request_queue::RequestQueue;

use crate::elevator::Elevator;
use crate::log_event;
use crate::stats::{ElevatorReport, SystemStatistics};
use crate::strategy::Strategy;

// Bounded pop so the loop rechecks the running flag promptly on shutdown.
const POP_TIMEOUT: Duration = Duration::from_millis(100);

pub struct Dispatcher {
    elevators: Vec<Arc<Elevator>>,
    max_floor: u8,
    strategy: Strategy,
    queue: RequestQueue,
    factory: RequestFactory,
    running: AtomicBool,
    processed: AtomicU32,
    rejected: AtomicU32,
    processing_times: Mutex<HashMap<u64, Duration>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl Dispatcher {
    /// The unit list is snapshotted here; its order is the stable tie-break
    /// for every strategy.
    pub fn new(elevators: Vec<Arc<Elevator>>, max_floor: u8, strategy: Strategy) -> Self {
        Dispatcher {
            elevators,
            max_floor,
            strategy,
            queue: RequestQueue::new(),
            factory: RequestFactory::new(),
            running: AtomicBool::new(false),
            processed: AtomicU32::new(0),
            rejected: AtomicU32::new(0),
            processing_times: Mutex::new(HashMap::new()),
            worker: Mutex::new(None),
        }
    }

    pub fn start(self: &Arc<Self>) {
        self.running.store(true, Ordering::SeqCst);
        let dispatcher = Arc::clone(self);
        let handle = thread::Builder::new()
            .name(String::from("dispatcher"))
            .spawn(move || dispatcher.dispatch_loop())
            .unwrap();
        *self.worker.lock().unwrap() = Some(handle);
    }

    /// Signals termination and joins the loop. Requests already queued are
    /// still drained; new pops stop once the queue runs dry.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.worker.lock().unwrap().take() {
            let _ = handle.join();
        }
    }

    fn dispatch_loop(&self) {
        while self.running.load(Ordering::SeqCst) || !self.queue.is_empty() {
            let Some(request) = self.queue.pop_timeout(POP_TIMEOUT) else {
                continue;
            };
            let started = Instant::now();
            let routed = self.route_request(&request);
            self.processing_times
                .lock()
                .unwrap()
                .insert(request.id(), started.elapsed());
            if routed {
                self.processed.fetch_add(1, Ordering::SeqCst);
            } else {
                self.rejected.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    fn route_request(&self, request: &Request) -> bool {
        if !self.is_valid_request(request) {
            log_event!(
                "rejecting invalid request #{} ({} -> {})",
                request.id(),
                request.floor(),
                request.target_floor()
            );
            return false;
        }
        match self.select_unit(request) {
            Some(elevator) => {
                log_event!(
                    "assigned {} to {} request #{} ({} -> {})",
                    elevator.name(),
                    request.kind().as_str(),
                    request.id(),
                    request.floor(),
                    request.target_floor()
                );
                elevator.add_request(request.clone());
                true
            }
            None => {
                log_event!("no unit available for request #{}", request.id());
                false
            }
        }
    }

    fn is_valid_request(&self, request: &Request) -> bool {
        let bounds = 1..=self.max_floor;
        bounds.contains(&request.floor())
            && bounds.contains(&request.target_floor())
            && request.floor() != request.target_floor()
    }

    /// Score every available unit and return the strict minimum; the first
    /// unit in registry order wins ties. Snapshots one unit at a time, so
    /// no two unit locks are ever held together.
    fn select_unit(&self, request: &Request) -> Option<Arc<Elevator>> {
        let mut best: Option<(f64, &Arc<Elevator>)> = None;
        for elevator in &self.elevators {
            if !elevator.is_available() {
                continue;
            }
            let view = elevator.dispatch_view();
            let score = self.strategy.score(&view, request);
            match best {
                Some((best_score, _)) if score >= best_score => {}
                _ => best = Some((score, elevator)),
            }
        }
        best.map(|(_, elevator)| Arc::clone(elevator))
    }

    pub fn submit(&self, request: Request) {
        self.queue.push(request);
    }

    pub fn submit_call(&self, from: u8, to: u8) {
        self.submit(self.factory.call(from, to));
    }

    pub fn submit_priority(&self, from: u8, to: u8) {
        self.submit(self.factory.priority(from, to));
    }

    pub fn submit_emergency(&self, from: u8, to: u8) {
        self.submit(self.factory.emergency(from, to));
    }

    pub fn submit_kind(&self, from: u8, to: u8, kind: RequestKind) {
        self.submit(self.factory.request(from, to, kind));
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn pending_requests(&self) -> usize {
        self.queue.len()
    }

    pub fn statistics(&self) -> SystemStatistics {
        let processed = self.processed.load(Ordering::SeqCst);
        let rejected = self.rejected.load(Ordering::SeqCst);

        let average_processing_time_ms = {
            let times = self.processing_times.lock().unwrap();
            if times.is_empty() {
                None
            } else {
                let total_ms: f64 = times.values().map(|d| d.as_secs_f64() * 1000.0).sum();
                Some(total_ms / times.len() as f64)
            }
        };

        let elevators = self
            .elevators
            .iter()
            .map(|elevator| ElevatorReport {
                id: elevator.id(),
                name: String::from(elevator.name()),
                status: String::from(elevator.status().as_str()),
                current_floor: elevator.current_floor(),
                passengers: elevator.passengers(),
                statistics: elevator.statistics(),
            })
            .collect();

        SystemStatistics {
            total_requests: processed + rejected,
            processed_requests: processed,
            rejected_requests: rejected,
            pending_requests: self.queue.len(),
            strategy: String::from(self.strategy.as_str()),
            average_processing_time_ms,
            elevators,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_resources::config::TimingConfig;

    fn test_timing() -> TimingConfig {
        TimingConfig {
            tick_ms: 1,
            door_dwell_ms: 5,
            priority_dwell_ms: 2,
            evacuation_dwell_ms: 5,
            evacuation_step_ms: 1,
            exit_probability: 0.0,
        }
    }

    fn unit(id: u8, start_floor: u8, capacity: u8) -> Arc<Elevator> {
        let name = format!("Lift-{id}");
        Arc::new(Elevator::new(id, &name, start_floor, 20, capacity, test_timing()))
    }

    #[test]
    fn rejects_out_of_bounds_and_equal_floors() {
        let dispatcher = Dispatcher::new(vec![unit(1, 1, 8)], 10, Strategy::Nearest);
        let factory = RequestFactory::new();
        assert!(!dispatcher.is_valid_request(&factory.call(0, 5)));
        assert!(!dispatcher.is_valid_request(&factory.call(5, 11)));
        assert!(!dispatcher.is_valid_request(&factory.call(4, 4)));
        assert!(dispatcher.is_valid_request(&factory.call(1, 10)));
    }

    #[test]
    fn nearest_routes_to_closest_unit() {
        let near = unit(1, 2, 8);
        let far = unit(2, 8, 8);
        let dispatcher = Dispatcher::new(vec![near, far], 10, Strategy::Nearest);
        let factory = RequestFactory::new();
        let selected = dispatcher.select_unit(&factory.call(3, 6)).unwrap();
        assert_eq!(selected.id(), 1);
    }

    #[test]
    fn ties_go_to_first_unit_in_registry_order() {
        let left = unit(1, 2, 8);
        let right = unit(2, 6, 8);
        // Origin 4 is equidistant from both.
        let dispatcher = Dispatcher::new(vec![left, right], 10, Strategy::Nearest);
        let factory = RequestFactory::new();
        let selected = dispatcher.select_unit(&factory.call(4, 8)).unwrap();
        assert_eq!(selected.id(), 1);
    }

    #[test]
    fn unavailable_units_are_skipped() {
        let busy = unit(1, 3, 2);
        busy.force_for_test(3, 2, &[]);
        let spare = unit(2, 9, 8);
        let dispatcher = Dispatcher::new(vec![busy, spare], 10, Strategy::Nearest);
        let factory = RequestFactory::new();
        let selected = dispatcher.select_unit(&factory.call(3, 6)).unwrap();
        assert_eq!(selected.id(), 2);
    }

    #[test]
    fn no_available_unit_means_rejection() {
        let maintained = unit(1, 3, 8);
        maintained.set_maintenance_mode(true);
        let dispatcher = Dispatcher::new(vec![maintained], 10, Strategy::Nearest);
        let factory = RequestFactory::new();
        assert!(dispatcher.select_unit(&factory.call(3, 6)).is_none());
        assert!(!dispatcher.route_request(&factory.call(3, 6)));
    }

    #[test]
    fn collective_selects_numerically_lower_score() {
        // Idle unit far away vs nearly-full busy unit close by; the idle
        // unit's score (4.25) beats the busy unit's (26.0).
        let idle_far = unit(1, 14, 10);
        let busy_near = unit(2, 3, 10);
        busy_near.force_for_test(3, 9, &[5, 7]);
        let dispatcher = Dispatcher::new(vec![idle_far, busy_near], 20, Strategy::Collective);
        let factory = RequestFactory::new();
        let selected = dispatcher.select_unit(&factory.call(4, 6)).unwrap();
        assert_eq!(selected.id(), 1);
    }
}
