/// ----- REQUEST QUEUE MODULE -----
/// Thread-safe priority queue of requests, ordered by the request total
/// order. The pop is a bounded wait so consumers can recheck their running
/// flag instead of blocking forever.

use std::collections::BinaryHeap;
use std::sync::{Condvar, Mutex};
use std::time::Duration;

use crate::request::Request;

pub struct RequestQueue {
    heap: Mutex<BinaryHeap<Request>>,
    available: Condvar,
}

impl RequestQueue {
    pub fn new() -> Self {
        RequestQueue {
            heap: Mutex::new(BinaryHeap::new()),
            available: Condvar::new(),
        }
    }

    pub fn push(&self, request: Request) {
        let mut heap = self.heap.lock().unwrap();
        heap.push(request);
        self.available.notify_one();
    }

    /// Pop the highest-priority request, waiting up to `timeout` for one
    /// to arrive. Returns None when the wait expires empty.
    pub fn pop_timeout(&self, timeout: Duration) -> Option<Request> {
        let mut heap = self.heap.lock().unwrap();
        if let Some(request) = heap.pop() {
            return Some(request);
        }
        let (mut heap, _) = self.available.wait_timeout(heap, timeout).unwrap();
        heap.pop()
    }

    pub fn len(&self) -> usize {
        self.heap.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.lock().unwrap().is_empty()
    }
}

impl Default for RequestQueue {
    fn default() -> Self {
        RequestQueue::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::RequestFactory;

    #[test]
    fn pops_in_priority_order() {
        let factory = RequestFactory::new();
        let queue = RequestQueue::new();
        queue.push(factory.call(1, 5));
        queue.push(factory.emergency(2, 6));
        queue.push(factory.priority(3, 7));

        let timeout = Duration::from_millis(10);
        assert_eq!(queue.pop_timeout(timeout).unwrap().priority(), 10);
        assert_eq!(queue.pop_timeout(timeout).unwrap().priority(), 8);
        assert_eq!(queue.pop_timeout(timeout).unwrap().priority(), 5);
        assert!(queue.is_empty());
    }

    #[test]
    fn equal_priority_pops_oldest_first() {
        let factory = RequestFactory::new();
        let queue = RequestQueue::new();
        let first = factory.call(1, 5);
        let second = factory.call(6, 2);
        let first_id = first.id();
        queue.push(second);
        queue.push(first);

        let popped = queue.pop_timeout(Duration::from_millis(10)).unwrap();
        assert_eq!(popped.id(), first_id);
    }

    #[test]
    fn pop_on_empty_queue_times_out() {
        let queue = RequestQueue::new();
        assert!(queue.pop_timeout(Duration::from_millis(5)).is_none());
    }
}
