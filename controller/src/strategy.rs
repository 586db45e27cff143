/// ----- STRATEGY MODULE -----
/// The closed set of assignment cost models. Every strategy scores a unit
/// for a request; the dispatcher routes to the minimum score, first unit in
/// registry order winning ties.

use shared_resources::direction::Direction;
use shared_resources::request::Request;

use crate::elevator::DispatchView;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Nearest,
    LeastBusy,
    Directional,
    Collective,
}

impl Strategy {
    pub fn from_name(name: &str) -> Strategy {
        match name {
            "NEAREST" => Strategy::Nearest,
            "LEAST_BUSY" => Strategy::LeastBusy,
            "DIRECTIONAL" => Strategy::Directional,
            _ => Strategy::Collective,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::Nearest => "NEAREST",
            Strategy::LeastBusy => "LEAST_BUSY",
            Strategy::Directional => "DIRECTIONAL",
            Strategy::Collective => "COLLECTIVE",
        }
    }

    pub fn score(self, view: &DispatchView, request: &Request) -> f64 {
        match self {
            Strategy::Nearest => distance(view.floor, request.floor()) as f64,
            Strategy::LeastBusy => {
                view.passengers as f64 / view.capacity as f64 + view.target_count as f64 * 0.1
            }
            Strategy::Directional => directional_score(view, request),
            Strategy::Collective => collective_score(view, request),
        }
    }
}

fn distance(a: u8, b: u8) -> u8 {
    a.abs_diff(b)
}

fn directional_score(view: &DispatchView, request: &Request) -> f64 {
    let mut score = distance(view.floor, request.floor()) as i32;

    if view.idle {
        score -= 5;
    } else if view.direction == request.direction() {
        let intercepts = match view.direction {
            Direction::Up => request.floor() >= view.floor,
            Direction::Down => request.floor() <= view.floor,
            Direction::None => false,
        };
        if intercepts {
            score -= 3;
        } else {
            score += 5;
        }
    } else {
        score += 10;
    }

    score += view.target_count as i32 * 2;
    score.max(0) as f64
}

fn collective_score(view: &DispatchView, request: &Request) -> f64 {
    let distance_to_origin = distance(view.floor, request.floor()) as f64;
    let estimated_wait = distance_to_origin + view.target_count as f64 * 3.0;

    let estimated_extra_travel = if view.passengers > 0 {
        let detour = distance_to_origin + distance(request.target_floor(), request.floor()) as f64;
        detour * view.passengers as f64 * 0.5
    } else {
        0.0
    };

    // Integer half-capacity matches the pinned cost model.
    let half_capacity = view.capacity / 2;
    let estimated_energy = if view.passengers < half_capacity {
        (half_capacity - view.passengers) as f64 * 0.5
    } else {
        0.0
    };

    let mut score = estimated_wait * 0.5 + estimated_extra_travel + estimated_energy * 0.1
        - request.priority() as f64 * 0.2;

    if view.passengers as f64 / view.capacity as f64 > 0.8 {
        score += 10.0;
    }

    score
}
