use std::collections::{HashMap, VecDeque};

use crate::control_system::intersection::{IntersectionId, Telemetry};

/// Short rolling window of readings per intersection, enough to draw recent trends.
#[derive(Debug)]
pub struct TrendHistory {
    capacity: usize,
    vehicle_history: HashMap<IntersectionId, VecDeque<u32>>,
    speed_history: HashMap<IntersectionId, VecDeque<f64>>,
}

fn push_bounded<T>(deque: &mut VecDeque<T>, capacity: usize, value: T) {
    while deque.len() >= capacity {
        deque.pop_front();
    }
    deque.push_back(value);
}

fn average<I: ExactSizeIterator<Item = f64>>(values: I) -> f64 {
    let len = values.len();
    if len == 0 {
        return 0.0;
    }
    values.sum::<f64>() / len as f64
}

impl TrendHistory {
    /// Create a new TrendHistory keeping at most `capacity` samples (minimum one).
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            vehicle_history: HashMap::new(),
            speed_history: HashMap::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Shrinking drops the oldest samples of every intersection straight away.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity.max(1);
        for deque in self.vehicle_history.values_mut() {
            while deque.len() > self.capacity {
                deque.pop_front();
            }
        }
        for deque in self.speed_history.values_mut() {
            while deque.len() > self.capacity {
                deque.pop_front();
            }
        }
    }

    pub fn record(&mut self, id: IntersectionId, telemetry: Telemetry) {
        let capacity = self.capacity;
        push_bounded(
            self.vehicle_history.entry(id).or_default(),
            capacity,
            telemetry.vehicles,
        );
        push_bounded(
            self.speed_history.entry(id).or_default(),
            capacity,
            telemetry.avg_speed,
        );
    }

    pub fn recent_vehicles(&self, id: IntersectionId) -> Vec<u32> {
        self.vehicle_history
            .get(&id)
            .map(|deque| deque.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn average_vehicles_for(&self, id: IntersectionId) -> f64 {
        self.vehicle_history
            .get(&id)
            .map_or(0.0, |deque| average(deque.iter().map(|&v| v as f64)))
    }

    pub fn average_speed_for(&self, id: IntersectionId) -> f64 {
        self.speed_history
            .get(&id)
            .map_or(0.0, |deque| average(deque.iter().copied()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(vehicles: u32, avg_speed: f64) -> Telemetry {
        Telemetry {
            vehicles,
            avg_speed,
        }
    }

    #[test]
    fn keeps_only_the_most_recent_samples() {
        let id = IntersectionId(1);
        let mut history = TrendHistory::new(3);
        for vehicles in 1..=5 {
            history.record(id, reading(vehicles, 30.0));
        }
        assert_eq!(history.recent_vehicles(id), vec![3, 4, 5]);
        assert_eq!(history.average_vehicles_for(id), 4.0);
    }

    #[test]
    fn unknown_intersection_averages_zero() {
        let history = TrendHistory::new(5);
        assert_eq!(history.average_speed_for(IntersectionId(9)), 0.0);
        assert!(history.recent_vehicles(IntersectionId(9)).is_empty());
    }

    #[test]
    fn shrinking_capacity_keeps_the_window_bounded() {
        let id = IntersectionId(3);
        let mut history = TrendHistory::new(5);
        for vehicles in 1..=5 {
            history.record(id, reading(vehicles, 30.0));
        }
        history.set_capacity(2);
        assert_eq!(history.recent_vehicles(id), vec![4, 5]);
        history.record(id, reading(6, 30.0));
        history.record(id, reading(7, 30.0));
        assert_eq!(history.recent_vehicles(id), vec![6, 7]);
        assert_eq!(history.average_speed_for(id), 30.0);
        assert_eq!(history.capacity(), 2);
    }

    #[test]
    fn zero_capacity_still_keeps_latest() {
        let id = IntersectionId(2);
        let mut history = TrendHistory::new(0);
        history.record(id, reading(10, 20.0));
        history.record(id, reading(12, 24.0));
        assert_eq!(history.recent_vehicles(id), vec![12]);
        assert_eq!(history.average_speed_for(id), 24.0);
    }
}
