/// ----- ELEVATOR MODULE -----
/// One elevator unit: an autonomously scheduled state machine owning its
/// target-floor set, inbound request queue and passenger count. All mutable
/// state sits behind a single mutex; a condition variable wakes the unit
/// immediately when maintenance clears or an emergency is raised, and every
/// blocking wait observes the shutdown flag.

use std::collections::{BTreeSet, BinaryHeap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use rand::Rng;

use shared_resources::config::TimingConfig;
use shared_resources::direction::Direction;
use shared_resources::request::{Request, RequestKind};

use crate::log_event;
use crate::stats::ElevatorStatistics;

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Stopped,
    Moving,
    DoorsOpen,
    Maintenance,
    Emergency,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Stopped => "STOPPED",
            Status::Moving => "MOVING",
            Status::DoorsOpen => "DOORS_OPEN",
            Status::Maintenance => "MAINTENANCE",
            Status::Emergency => "EMERGENCY",
        }
    }
}

struct ElevatorState {
    current_floor: u8,
    direction: Direction,
    status: Status,
    targets: BTreeSet<u8>,
    inbound: BinaryHeap<Request>,
    passengers: u8,
    total_passengers: u32,
    total_traveled_floors: u32,
    total_idle: Duration,
    last_status_change: Instant,
    priority_floors: BTreeSet<u8>,
    emergency_mode: bool,
    maintenance_mode: bool,
}

/// One-lock snapshot handed to the dispatcher for scoring, so no two unit
/// locks are ever held at the same time.
#[derive(Debug, Clone, Copy)]
pub struct DispatchView {
    pub floor: u8,
    pub direction: Direction,
    pub passengers: u8,
    pub capacity: u8,
    pub target_count: usize,
    pub idle: bool,
}

pub struct Elevator {
    id: u8,
    name: String,
    max_floor: u8,
    capacity: u8,
    timing: TimingConfig,
    state: Mutex<ElevatorState>,
    wake: Condvar,
    shutdown: AtomicBool,
}

impl Elevator {
    pub fn new(
        id: u8,
        name: &str,
        start_floor: u8,
        max_floor: u8,
        capacity: u8,
        timing: TimingConfig,
    ) -> Self {
        let mut priority_floors = BTreeSet::new();
        priority_floors.insert(1);
        priority_floors.insert(max_floor);
        Elevator {
            id,
            name: String::from(name),
            max_floor,
            capacity,
            timing,
            state: Mutex::new(ElevatorState {
                current_floor: start_floor,
                direction: Direction::None,
                status: Status::Stopped,
                targets: BTreeSet::new(),
                inbound: BinaryHeap::new(),
                passengers: 0,
                total_passengers: 0,
                total_traveled_floors: 0,
                total_idle: Duration::ZERO,
                last_status_change: Instant::now(),
                priority_floors,
                emergency_mode: false,
                maintenance_mode: false,
            }),
            wake: Condvar::new(),
            shutdown: AtomicBool::new(false),
        }
    }

    pub fn id(&self) -> u8 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn capacity(&self) -> u8 {
        self.capacity
    }

    pub fn max_floor(&self) -> u8 {
        self.max_floor
    }

    /// Control loop, one thread per unit. Runs until `stop()`.
    pub fn run(&self) {
        while !self.shutdown.load(Ordering::Relaxed) {
            let mut state = self.state.lock().unwrap();

            if state.maintenance_mode {
                self.set_status(&mut state, Status::Maintenance);
                while state.maintenance_mode && !self.shutdown.load(Ordering::Relaxed) {
                    state = self.wake.wait(state).unwrap();
                }
                continue;
            }

            if state.emergency_mode {
                self.set_status(&mut state, Status::Emergency);
                self.run_evacuation_step(state);
                continue;
            }

            if state.status == Status::Stopped && state.targets.is_empty() {
                let now = Instant::now();
                let idle = now - state.last_status_change;
                state.total_idle += idle;
                state.last_status_change = now;
            }

            self.process_inbound(&mut state);

            if !state.targets.is_empty() {
                if let Some(next) = next_target(&mut state) {
                    self.move_towards(&mut state, next);
                }
            } else if state.status != Status::Stopped {
                self.set_status(&mut state, Status::Stopped);
            }

            if state.targets.contains(&state.current_floor) {
                state = self.stop_at_floor(state);
            }

            let tick = self.timing.tick();
            let _ = self.wake.wait_timeout(state, tick).unwrap();
        }
    }

    /// One evacuation step per tick: move a floor towards the nearest
    /// priority floor, or open up, dwell and clear the emergency once there.
    fn run_evacuation_step<'a>(&'a self, mut state: MutexGuard<'a, ElevatorState>) {
        let target = evacuation_floor(&state);
        if state.current_floor != target {
            self.move_towards(&mut state, target);
            let step = self.timing.evacuation_step();
            let _ = self.wake.wait_timeout(state, step).unwrap();
            return;
        }

        self.set_status(&mut state, Status::DoorsOpen);
        log_event!("{}: evacuating at floor {}", self.name, state.current_floor);
        state = self.dwell(state, self.timing.evacuation_dwell());
        if self.shutdown.load(Ordering::Relaxed) {
            return;
        }
        state.emergency_mode = false;
        self.set_status(&mut state, Status::Stopped);
        recalculate_direction(&mut state);
    }

    /// Drain the inbound queue into the target set, applying the capacity
    /// rules: non-emergency boarding at a full unit is dropped whole,
    /// emergencies always get their floors.
    fn process_inbound(&self, state: &mut ElevatorState) {
        while let Some(request) = state.inbound.pop() {
            if state.passengers >= self.capacity && request.kind() != RequestKind::Emergency {
                log_event!(
                    "{}: at capacity, dropping request #{}",
                    self.name,
                    request.id()
                );
                continue;
            }

            add_target(state, request.floor(), self.max_floor);
            add_target(state, request.target_floor(), self.max_floor);

            if request.kind() != RequestKind::Call {
                state.passengers = state.passengers.saturating_add(1).min(self.capacity);
            }
            state.total_passengers += 1;

            if matches!(request.kind(), RequestKind::Priority | RequestKind::Emergency) {
                recalculate_direction(state);
            }
        }
    }

    fn move_towards(&self, state: &mut ElevatorState, target: u8) {
        if target == state.current_floor {
            return;
        }
        self.set_status(state, Status::Moving);
        if target > state.current_floor {
            state.current_floor += 1;
            state.direction = Direction::Up;
        } else {
            state.current_floor -= 1;
            state.direction = Direction::Down;
        }
        state.total_traveled_floors += 1;
    }

    /// Arrival handling: doors open, dwell (longer on priority floors),
    /// passengers exit, doors close, direction recomputed.
    fn stop_at_floor<'a>(
        &'a self,
        mut state: MutexGuard<'a, ElevatorState>,
    ) -> MutexGuard<'a, ElevatorState> {
        self.set_status(&mut state, Status::DoorsOpen);
        let floor = state.current_floor;
        log_event!("{}: stopped at floor {}, doors open", self.name, floor);
        state.targets.remove(&floor);

        let mut dwell = self.timing.door_dwell();
        if state.priority_floors.contains(&floor) {
            dwell += self.timing.priority_dwell();
        }
        state = self.dwell(state, dwell);

        // An emergency raised mid-dwell owns the unit from here.
        if state.emergency_mode || self.shutdown.load(Ordering::Relaxed) {
            return state;
        }

        let exiting = self.simulate_passenger_exit(state.passengers);
        state.passengers -= exiting;
        log_event!(
            "{}: doors closing, {} passengers on board",
            self.name,
            state.passengers
        );
        self.set_status(&mut state, Status::Stopped);
        recalculate_direction(&mut state);
        state
    }

    /// Wait out a simulated duration without holding the lock the whole
    /// time, so accessors stay responsive and shutdown can interrupt.
    fn dwell<'a>(
        &'a self,
        mut state: MutexGuard<'a, ElevatorState>,
        duration: Duration,
    ) -> MutexGuard<'a, ElevatorState> {
        let deadline = Instant::now() + duration;
        while !self.shutdown.load(Ordering::Relaxed) {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            let (guard, _) = self.wake.wait_timeout(state, deadline - now).unwrap();
            state = guard;
        }
        state
    }

    fn simulate_passenger_exit(&self, passengers: u8) -> u8 {
        let mut rng = rand::rng();
        let mut exiting = 0;
        for _ in 0..passengers {
            if rng.random::<f64>() < self.timing.exit_probability {
                exiting += 1;
            }
        }
        exiting
    }

    fn set_status(&self, state: &mut ElevatorState, status: Status) {
        if state.status != status {
            state.status = status;
            state.last_status_change = Instant::now();
        }
    }

    /// Non-blocking enqueue; the unit drains it on its own schedule.
    pub fn add_request(&self, request: Request) {
        let mut state = self.state.lock().unwrap();
        state.inbound.push(request);
    }

    pub fn set_emergency_mode(&self, emergency: bool) {
        let mut state = self.state.lock().unwrap();
        state.emergency_mode = emergency;
        if emergency {
            self.set_status(&mut state, Status::Emergency);
            let kept: BinaryHeap<Request> = state
                .inbound
                .drain()
                .filter(|request| request.kind() == RequestKind::Emergency)
                .collect();
            state.inbound = kept;
            state.targets.clear();
            self.wake.notify_all();
        }
    }

    pub fn set_maintenance_mode(&self, maintenance: bool) {
        let mut state = self.state.lock().unwrap();
        state.maintenance_mode = maintenance;
        if maintenance {
            self.set_status(&mut state, Status::Maintenance);
        } else {
            self.set_status(&mut state, Status::Stopped);
            self.wake.notify_all();
        }
    }

    pub fn add_priority_floor(&self, floor: u8) {
        if (1..=self.max_floor).contains(&floor) {
            let mut state = self.state.lock().unwrap();
            state.priority_floors.insert(floor);
        }
    }

    pub fn current_floor(&self) -> u8 {
        self.state.lock().unwrap().current_floor
    }

    pub fn direction(&self) -> Direction {
        self.state.lock().unwrap().direction
    }

    pub fn status(&self) -> Status {
        self.state.lock().unwrap().status
    }

    pub fn passengers(&self) -> u8 {
        self.state.lock().unwrap().passengers
    }

    pub fn target_floors_count(&self) -> usize {
        self.state.lock().unwrap().targets.len()
    }

    pub fn is_idle(&self) -> bool {
        let state = self.state.lock().unwrap();
        idle(&state)
    }

    pub fn is_available(&self) -> bool {
        let state = self.state.lock().unwrap();
        !state.emergency_mode && !state.maintenance_mode && state.passengers < self.capacity
    }

    pub fn dispatch_view(&self) -> DispatchView {
        let state = self.state.lock().unwrap();
        DispatchView {
            floor: state.current_floor,
            direction: state.direction,
            passengers: state.passengers,
            capacity: self.capacity,
            target_count: state.targets.len(),
            idle: idle(&state),
        }
    }

    pub fn statistics(&self) -> ElevatorStatistics {
        let state = self.state.lock().unwrap();
        let efficiency = if state.total_passengers > 0 {
            state.total_traveled_floors as f64 / state.total_passengers as f64
        } else {
            0.0
        };
        ElevatorStatistics {
            total_passengers: state.total_passengers,
            total_traveled_floors: state.total_traveled_floors,
            current_passengers: state.passengers,
            idle_time_seconds: state.total_idle.as_secs(),
            target_floors_count: state.targets.len(),
            is_idle: idle(&state),
            efficiency,
        }
    }

    /// Human-readable snapshot for reporting only.
    pub fn full_info(&self) -> String {
        let state = self.state.lock().unwrap();
        let mut info = format!("{}:\n", self.name);
        info.push_str(&format!("  floor: {}\n", state.current_floor));
        info.push_str(&format!("  status: {}\n", state.status.as_str()));
        info.push_str(&format!("  direction: {}\n", state.direction.as_str()));
        info.push_str(&format!(
            "  passengers: {}/{}\n",
            state.passengers, self.capacity
        ));
        info.push_str(&format!("  targets: {:?}\n", state.targets));
        info.push_str(&format!("  total transported: {}\n", state.total_passengers));
        if state.emergency_mode {
            info.push_str("  EMERGENCY MODE\n");
        }
        if state.maintenance_mode {
            info.push_str("  MAINTENANCE MODE\n");
        }
        info
    }

    pub fn stop(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
        // Notify under the lock so a unit between its flag check and its
        // wait cannot miss the wakeup.
        let _state = self.state.lock().unwrap();
        self.wake.notify_all();
    }

    #[cfg(test)]
    pub(crate) fn force_for_test(&self, floor: u8, passengers: u8, targets: &[u8]) {
        let mut state = self.state.lock().unwrap();
        state.current_floor = floor;
        state.passengers = passengers;
        state.targets = targets.iter().copied().collect();
    }
}

fn idle(state: &ElevatorState) -> bool {
    state.targets.is_empty()
        && state.status == Status::Stopped
        && !state.emergency_mode
        && !state.maintenance_mode
}

fn add_target(state: &mut ElevatorState, floor: u8, max_floor: u8) {
    if (1..=max_floor).contains(&floor) {
        state.targets.insert(floor);
    }
}

/// SCAN target choice: keep going the current way, wrapping to the far end
/// when nothing is left on this side; from standstill take the nearest
/// target and face it.
fn next_target(state: &mut ElevatorState) -> Option<u8> {
    if state.targets.is_empty() {
        return None;
    }
    match state.direction {
        Direction::Up => state
            .targets
            .range(state.current_floor..)
            .next()
            .copied()
            .or_else(|| state.targets.iter().next_back().copied()),
        Direction::Down => state
            .targets
            .range(..=state.current_floor)
            .next_back()
            .copied()
            .or_else(|| state.targets.iter().next().copied()),
        Direction::None => {
            let current = state.current_floor;
            let nearest = state.targets.iter().copied().min_by_key(|floor| current.abs_diff(*floor))?;
            state.direction = if nearest > current {
                Direction::Up
            } else {
                Direction::Down
            };
            Some(nearest)
        }
    }
}

/// Continue the current direction while a target remains on that side,
/// otherwise reverse; no targets at all means no direction.
fn recalculate_direction(state: &mut ElevatorState) {
    if state.targets.is_empty() {
        state.direction = Direction::None;
        return;
    }
    match state.direction {
        Direction::Up => {
            let has_above = state
                .targets
                .iter()
                .next_back()
                .is_some_and(|&floor| floor > state.current_floor);
            if !has_above {
                state.direction = Direction::Down;
            }
        }
        Direction::Down => {
            let has_below = state
                .targets
                .iter()
                .next()
                .is_some_and(|&floor| floor < state.current_floor);
            if !has_below {
                state.direction = Direction::Up;
            }
        }
        Direction::None => {}
    }
}

/// Nearest priority floor by absolute distance (lowest wins a tie); floor 1
/// immediately if the unit is already there.
fn evacuation_floor(state: &ElevatorState) -> u8 {
    if state.current_floor == 1 {
        return 1;
    }
    let current = state.current_floor;
    state
        .priority_floors
        .iter()
        .copied()
        .min_by_key(|floor| current.abs_diff(*floor))
        .unwrap_or(if current > 1 { current - 1 } else { current + 1 })
}
