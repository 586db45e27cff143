/// ----- REQUEST MODULE -----
/// Immutable transport request and the total order every priority queue in
/// the system relies on: higher priority first, ties broken by earlier
/// creation time. Request ids come from a factory-owned atomic counter so
/// their order refines the timestamp order at millisecond resolution.

use std::cmp::Ordering;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::direction::Direction;

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Call,
    Priority,
    Emergency,
}

impl RequestKind {
    pub fn default_priority(self) -> u8 {
        match self {
            RequestKind::Call => 5,
            RequestKind::Priority => 8,
            RequestKind::Emergency => 10,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RequestKind::Call => "CALL",
            RequestKind::Priority => "PRIORITY",
            RequestKind::Emergency => "EMERGENCY",
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone)]
pub struct Request {
    id: u64,
    floor: u8,
    direction: Direction,
    target_floor: u8,
    timestamp_ms: u64,
    kind: RequestKind,
    priority: u8,
}

impl Request {
    pub fn new(
        id: u64,
        floor: u8,
        direction: Direction,
        target_floor: u8,
        kind: RequestKind,
        priority: u8,
    ) -> Self {
        let timestamp_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis() as u64)
            .unwrap_or(0);
        Request {
            id,
            floor,
            direction,
            target_floor,
            timestamp_ms,
            kind,
            priority: priority.clamp(1, 10),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn floor(&self) -> u8 {
        self.floor
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn target_floor(&self) -> u8 {
        self.target_floor
    }

    pub fn timestamp_ms(&self) -> u64 {
        self.timestamp_ms
    }

    pub fn kind(&self) -> RequestKind {
        self.kind
    }

    pub fn priority(&self) -> u8 {
        self.priority
    }
}

impl Ord for Request {
    fn cmp(&self, other: &Self) -> Ordering {
        // Greatest element = highest priority, then earliest creation,
        // then lowest id. BinaryHeap pops the greatest first.
        self.priority
            .cmp(&other.priority)
            .then_with(|| other.timestamp_ms.cmp(&self.timestamp_ms))
            .then_with(|| other.id.cmp(&self.id))
    }
}

impl PartialOrd for Request {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Request {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Request {}

/// Owns the monotonic id counter for requests it hands out.
pub struct RequestFactory {
    next_id: AtomicU64,
}

impl RequestFactory {
    pub fn new() -> Self {
        RequestFactory {
            next_id: AtomicU64::new(1),
        }
    }

    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, AtomicOrdering::Relaxed)
    }

    pub fn request(&self, from: u8, to: u8, kind: RequestKind) -> Request {
        self.with_priority(from, to, kind, kind.default_priority())
    }

    pub fn with_priority(&self, from: u8, to: u8, kind: RequestKind, priority: u8) -> Request {
        Request::new(
            self.next_id(),
            from,
            Direction::between(from, to),
            to,
            kind,
            priority,
        )
    }

    pub fn call(&self, from: u8, to: u8) -> Request {
        self.request(from, to, RequestKind::Call)
    }

    pub fn priority(&self, from: u8, to: u8) -> Request {
        self.request(from, to, RequestKind::Priority)
    }

    pub fn emergency(&self, from: u8, to: u8) -> Request {
        self.request(from, to, RequestKind::Emergency)
    }
}

impl Default for RequestFactory {
    fn default() -> Self {
        RequestFactory::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_defaults_and_clamping() {
        let factory = RequestFactory::new();
        assert_eq!(factory.call(1, 5).priority(), 5);
        assert_eq!(factory.priority(1, 5).priority(), 8);
        assert_eq!(factory.emergency(1, 5).priority(), 10);
        assert_eq!(factory.with_priority(1, 5, RequestKind::Call, 0).priority(), 1);
        assert_eq!(factory.with_priority(1, 5, RequestKind::Call, 99).priority(), 10);
    }

    #[test]
    fn direction_derived_from_floor_pair() {
        let factory = RequestFactory::new();
        assert_eq!(factory.call(2, 7).direction(), Direction::Up);
        assert_eq!(factory.call(7, 2).direction(), Direction::Down);
    }

    #[test]
    fn ids_are_monotonic() {
        let factory = RequestFactory::new();
        let first = factory.call(1, 2);
        let second = factory.call(1, 2);
        assert!(second.id() > first.id());
    }

    #[test]
    fn higher_priority_is_greater() {
        let factory = RequestFactory::new();
        let call = factory.call(1, 5);
        let emergency = factory.emergency(3, 4);
        assert!(emergency > call);
    }

    #[test]
    fn equal_priority_earlier_creation_is_greater() {
        let factory = RequestFactory::new();
        let first = factory.call(1, 5);
        let second = factory.call(2, 6);
        // Same priority; first was created no later and has the lower id.
        assert!(first > second);
    }
}
