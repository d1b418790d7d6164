//! # Proximity Penalty
//!
//! Scores how badly the robot intrudes on the crowd in a single frame.
//!
//! Overlapping disks are penalised by severity band of the overlap ratio
//! `(r_robot + r_ped - d) / (r_robot + r_ped)`; a pedestrian that is not
//! touched but still within `close_radius` costs a small flat amount. All
//! thresholds are strict, so a distance exactly on a boundary falls to the
//! lighter side.

use crate::pedestrian::Pedestrian;
use crate::robot::Robot;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PenaltyConfig {
    pub close_radius: f64,
    pub near_penalty: f64,
    pub low_band_limit: f64,
    pub mid_band_limit: f64,
    pub overlap_low: f64,
    pub overlap_mid: f64,
    pub overlap_high: f64,
}

impl Default for PenaltyConfig {
    fn default() -> Self {
        PenaltyConfig {
            close_radius: 48.0,
            near_penalty: 0.1,
            low_band_limit: 0.33,
            mid_band_limit: 0.66,
            overlap_low: 0.5,
            overlap_mid: 1.0,
            overlap_high: 1.5,
        }
    }
}

impl PenaltyConfig {
    /// Penalty for a single robot/pedestrian pair at `distance`.
    pub fn pair_penalty(&self, distance: f64, overlap_distance: f64) -> f64 {
        if distance < overlap_distance {
            let overlap_ratio = (overlap_distance - distance) / overlap_distance;
            if overlap_ratio < self.low_band_limit {
                self.overlap_low
            } else if overlap_ratio < self.mid_band_limit {
                self.overlap_mid
            } else {
                self.overlap_high
            }
        } else if distance < self.close_radius {
            self.near_penalty
        } else {
            0.0
        }
    }

    pub fn frame_penalty(&self, robot: &Robot, pedestrians: &[Pedestrian]) -> f64 {
        pedestrians
            .iter()
            .map(|ped| {
                let distance = robot.position.distance(&ped.position);
                self.pair_penalty(distance, robot.radius + ped.radius)
            })
            .sum()
    }
}

/// Frame penalty with the default bands.
pub fn compute_penalty(robot: &Robot, pedestrians: &[Pedestrian]) -> f64 {
    PenaltyConfig::default().frame_penalty(robot, pedestrians)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structs::Point;
    use approx::assert_relative_eq;

    fn ped_at(x: f64, y: f64) -> Pedestrian {
        Pedestrian::new(Point::new(x, y), Point::new(0.0, 0.0), 10.0)
    }

    // ==================== Band Tests ====================

    #[test]
    fn test_pair_penalty_low_band() {
        // ratio (20 - 19) / 20 = 0.05
        assert_eq!(PenaltyConfig::default().pair_penalty(19.0, 20.0), 0.5);
    }

    #[test]
    fn test_pair_penalty_mid_band() {
        // ratio (20 - 10) / 20 = 0.5
        assert_eq!(PenaltyConfig::default().pair_penalty(10.0, 20.0), 1.0);
    }

    #[test]
    fn test_pair_penalty_high_band() {
        // ratio (20 - 5) / 20 = 0.75
        assert_eq!(PenaltyConfig::default().pair_penalty(5.0, 20.0), 1.5);
    }

    #[test]
    fn test_pair_penalty_boundaries_fall_low() {
        let cfg = PenaltyConfig::default();
        assert_eq!(cfg.pair_penalty(20.0, 20.0), 0.1, "Touching is near, not overlap");
        assert_eq!(cfg.pair_penalty(48.0, 20.0), 0.0, "Exactly close_radius is free");
    }

    // ==================== Frame Tests ====================

    #[test]
    fn test_compute_penalty_sums_pedestrians() {
        let robot = Robot::new(Point::new(100.0, 100.0));
        // overlap distance 22: d=21 gives low band, d=30 is near, d=200 is free
        let crowd = vec![ped_at(121.0, 100.0), ped_at(100.0, 130.0), ped_at(300.0, 100.0)];
        assert_relative_eq!(compute_penalty(&robot, &crowd), 0.6, epsilon = 1e-12);
    }

    #[test]
    fn test_compute_penalty_zero_when_far() {
        let robot = Robot::new(Point::new(100.0, 100.0));
        let crowd = vec![ped_at(200.0, 100.0), ped_at(100.0, 300.0)];
        assert_eq!(compute_penalty(&robot, &crowd), 0.0);
    }

    #[test]
    fn test_compute_penalty_empty_crowd() {
        let robot = Robot::new(Point::new(100.0, 100.0));
        assert_eq!(compute_penalty(&robot, &[]), 0.0);
    }

    #[test]
    fn test_compute_penalty_non_negative() {
        let robot = Robot::new(Point::new(100.0, 100.0));
        for i in 0..100 {
            let crowd = vec![ped_at(100.0 + i as f64 * 0.7, 100.0)];
            assert!(compute_penalty(&robot, &crowd) >= 0.0);
        }
    }
}
