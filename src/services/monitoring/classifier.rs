use crate::domain::{MonitoringRecord, Proximity, Reaction, Zone, ZoneStatus, ZoneType};
use crate::env_config::models::app_config::ZonesConfig;

/// Beyond this distance from every zone midpoint a symbol is FAR.
pub const FAR_THRESHOLD_PERCENT: f64 = 1.5;

/// Distance reported when a symbol has no zones at all.
const NO_ZONE_DISTANCE: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProximityClassifier {
    near_threshold: f64,
    far_threshold: f64,
}

impl Default for ProximityClassifier {
    fn default() -> Self {
        Self::new(0.5)
    }
}

impl From<&ZonesConfig> for ProximityClassifier {
    fn from(cfg: &ZonesConfig) -> Self {
        Self::new(cfg.near_zone_percent)
    }
}

impl ProximityClassifier {
    /// `near_threshold` is in percent of the zone midpoint (0.5 means half a percent).
    pub fn new(near_threshold: f64) -> Self {
        Self {
            near_threshold,
            far_threshold: FAR_THRESHOLD_PERCENT,
        }
    }

    /// Classifies `ltp` against `zones` in the order given.
    ///
    /// The first zone containing the price wins outright. Otherwise the zone
    /// with the smallest absolute midpoint distance is reported; on equal
    /// distances the earlier zone is kept.
    pub fn classify(&self, ltp: f64, zones: &[Zone]) -> Proximity {
        let mut closest: Option<(&Zone, f64)> = None;

        for zone in zones {
            let mid = zone.midpoint();
            let distance = (ltp - mid) / mid * 100.0;

            if zone.contains(ltp) {
                let status = match zone.zone_type {
                    ZoneType::Bullish => ZoneStatus::InsideBullish,
                    ZoneType::Bearish => ZoneStatus::InsideBearish,
                };
                return Proximity {
                    status,
                    closest_zone: Some(zone.clone()),
                    distance_percent: distance,
                    reaction: Reaction::Holding,
                };
            }

            let is_closer = match closest {
                Some((_, best)) => distance.abs() < best.abs(),
                None => true,
            };
            if is_closer {
                closest = Some((zone, distance));
            }
        }

        match closest {
            Some((zone, distance)) => {
                let (status, reaction) = self.band(distance.abs());
                Proximity {
                    status,
                    closest_zone: Some(zone.clone()),
                    distance_percent: distance,
                    reaction,
                }
            }
            None => Proximity {
                status: ZoneStatus::Far,
                closest_zone: None,
                distance_percent: NO_ZONE_DISTANCE,
                reaction: Reaction::NoTouchYet,
            },
        }
    }

    fn band(&self, abs_distance: f64) -> (ZoneStatus, Reaction) {
        if abs_distance <= self.near_threshold {
            (ZoneStatus::Near, Reaction::FirstTouch)
        } else if abs_distance > self.far_threshold {
            (ZoneStatus::Far, Reaction::NoTouchYet)
        } else {
            (ZoneStatus::Near, Reaction::NoTouchYet)
        }
    }
}

pub fn alerts(records: &[MonitoringRecord]) -> Vec<MonitoringRecord> {
    records.iter().filter(|r| r.is_alert()).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ImpulseStrength, Timeframe};
    use chrono::NaiveDate;

    fn zone(zone_type: ZoneType, low: f64, high: f64) -> Zone {
        Zone::new(
            "SBIN",
            NaiveDate::from_ymd_opt(2026, 1, 28).unwrap(),
            Timeframe::Minute15,
            zone_type,
            low,
            high,
            ImpulseStrength::High,
        )
        .unwrap()
    }

    fn record(status: ZoneStatus, reaction: Reaction) -> MonitoringRecord {
        MonitoringRecord::from_proximity(
            "SBIN",
            710.0,
            vec![],
            Proximity {
                status,
                closest_zone: None,
                distance_percent: 0.0,
                reaction,
            },
            NaiveDate::from_ymd_opt(2026, 1, 28).unwrap(),
            NaiveDate::from_ymd_opt(2026, 1, 30).unwrap(),
        )
    }

    #[test]
    fn test_inside_bullish_zone_is_holding() {
        let zones = vec![
            zone(ZoneType::Bullish, 700.0, 720.0),
            zone(ZoneType::Bullish, 800.0, 820.0),
        ];

        let p = ProximityClassifier::default().classify(710.0, &zones);

        assert_eq!(p.status, ZoneStatus::InsideBullish);
        assert_eq!(p.reaction, Reaction::Holding);
        assert_eq!(p.distance_percent, 0.0);
        assert_eq!(p.closest_zone, Some(zones[0].clone()));
    }

    #[test]
    fn test_inside_bearish_zone() {
        let zones = vec![zone(ZoneType::Bearish, 700.0, 720.0)];

        let p = ProximityClassifier::default().classify(715.0, &zones);

        assert_eq!(p.status, ZoneStatus::InsideBearish);
        assert_eq!(p.reaction, Reaction::Holding);
        assert!(p.distance_percent > 0.0);
    }

    #[test]
    fn test_containment_beats_an_earlier_closer_zone() {
        // The bearish zone's midpoint is nearer, but price sits inside the bullish one.
        let zones = vec![
            zone(ZoneType::Bearish, 719.5, 722.0),
            zone(ZoneType::Bullish, 700.0, 720.0),
        ];

        let p = ProximityClassifier::default().classify(719.0, &zones);

        assert_eq!(p.status, ZoneStatus::InsideBullish);
        assert_eq!(p.closest_zone, Some(zones[1].clone()));
    }

    #[test]
    fn test_first_containing_zone_wins() {
        let zones = vec![
            zone(ZoneType::Bullish, 700.0, 720.0),
            zone(ZoneType::Bearish, 709.0, 711.0),
        ];

        let p = ProximityClassifier::default().classify(710.0, &zones);

        assert_eq!(p.status, ZoneStatus::InsideBullish);
        assert_eq!(p.closest_zone, Some(zones[0].clone()));
    }

    #[test]
    fn test_near_within_threshold_is_first_touch() {
        let zones = vec![zone(ZoneType::Bullish, 708.0, 712.0)];

        let p = ProximityClassifier::default().classify(706.5, &zones);

        assert_eq!(p.status, ZoneStatus::Near);
        assert_eq!(p.reaction, Reaction::FirstTouch);
        assert!((p.distance_percent - (-3.5 / 710.0 * 100.0)).abs() < 1e-12);
        assert!(p.distance_percent < 0.0);
    }

    #[test]
    fn test_between_thresholds_is_near_without_touch() {
        let zones = vec![zone(ZoneType::Bullish, 708.0, 712.0)];

        let p = ProximityClassifier::default().classify(717.1, &zones);

        assert_eq!(p.status, ZoneStatus::Near);
        assert_eq!(p.reaction, Reaction::NoTouchYet);
    }

    #[test]
    fn test_far_from_every_zone() {
        let zones = vec![
            zone(ZoneType::Bearish, 600.0, 610.0),
            zone(ZoneType::Bullish, 700.0, 720.0),
        ];

        let p = ProximityClassifier::default().classify(800.0, &zones);

        assert_eq!(p.status, ZoneStatus::Far);
        assert_eq!(p.reaction, Reaction::NoTouchYet);
        assert_eq!(p.closest_zone, Some(zones[1].clone()));
    }

    #[test]
    fn test_no_zones() {
        let p = ProximityClassifier::default().classify(710.0, &[]);

        assert_eq!(p.status, ZoneStatus::Far);
        assert_eq!(p.closest_zone, None);
        assert_eq!(p.distance_percent, 100.0);
        assert_eq!(p.reaction, Reaction::NoTouchYet);
    }

    #[test]
    fn test_equal_distance_keeps_first_zone() {
        let zones = vec![
            zone(ZoneType::Bearish, 708.0, 712.0),
            zone(ZoneType::Bullish, 706.0, 714.0),
        ];

        let p = ProximityClassifier::default().classify(720.0, &zones);

        assert_eq!(p.closest_zone, Some(zones[0].clone()));
        assert_eq!(p.status, ZoneStatus::Near);
    }

    #[test]
    fn test_wider_near_threshold() {
        let zones = vec![zone(ZoneType::Bullish, 708.0, 712.0)];

        let p = ProximityClassifier::new(1.0).classify(716.0, &zones);

        assert_eq!(p.status, ZoneStatus::Near);
        assert_eq!(p.reaction, Reaction::FirstTouch);
    }

    #[test]
    fn test_alerts_filter() {
        let records = vec![
            record(ZoneStatus::InsideBullish, Reaction::Holding),
            record(ZoneStatus::InsideBearish, Reaction::Holding),
            record(ZoneStatus::Near, Reaction::FirstTouch),
            record(ZoneStatus::Near, Reaction::NoTouchYet),
            record(ZoneStatus::Far, Reaction::NoTouchYet),
            record(ZoneStatus::Far, Reaction::FirstTouch),
        ];

        let found = alerts(&records);

        assert_eq!(found.len(), 3);
        assert!(found.iter().all(|r| r.status != ZoneStatus::Far));
        assert!(found.iter().all(|r| r.reaction != Reaction::NoTouchYet));
    }
}
