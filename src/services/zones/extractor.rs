// File: src/services/zones/extractor.rs
use crate::domain::{Candle, ImpulseStrength, Timeframe, Zone, ZoneType};
use crate::env_config::models::app_config::ZonesConfig;
use chrono::NaiveDate;
use tracing::debug;

/// Fewer candles than this yield no zone.
pub const MIN_CANDLES: usize = 20;
pub const ATR_PERIOD: usize = 14;

// Impulse pairs (i, j) satisfy IMPULSE_MIN_SPAN <= j - i < IMPULSE_MAX_SPAN
const IMPULSE_MIN_SPAN: usize = 3;
const IMPULSE_MAX_SPAN: usize = 20;
const MAX_PULLBACK_RATIO: f64 = 0.3;
const HIGH_STRENGTH_ATR: f64 = 2.0;

const COMPRESSION_RATIO: f64 = 2.5;
const BALANCE_RATIO: f64 = 0.5;
const DEPARTURE_RANGES: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtractorParams {
    pub atr_multiplier: f64,
    pub zone_candles_min: usize,
    pub zone_candles_max: usize,
}

impl Default for ExtractorParams {
    fn default() -> Self {
        Self {
            atr_multiplier: 1.5,
            zone_candles_min: 2,
            zone_candles_max: 6,
        }
    }
}

impl From<&ZonesConfig> for ExtractorParams {
    fn from(cfg: &ZonesConfig) -> Self {
        Self {
            atr_multiplier: cfg.atr_multiplier,
            zone_candles_min: cfg.zone_candles_min,
            zone_candles_max: cfg.zone_candles_max,
        }
    }
}

/// Dominant directional move of the day.
#[derive(Debug, Clone, PartialEq)]
pub struct Impulse {
    pub direction: ZoneType,
    pub start_idx: usize,
    pub end_idx: usize,
    pub net_move: f64,
    pub strength: ImpulseStrength,
}

/// Balanced range right before the impulse.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OriginWindow {
    pub low: f64,
    pub high: f64,
    pub candle_count: usize,
}

impl OriginWindow {
    fn midpoint(&self) -> f64 {
        (self.low + self.high) / 2.0
    }

    fn range(&self) -> f64 {
        self.high - self.low
    }
}

/// Finds the last balanced range before the day's largest impulse.
///
/// Pure and deterministic: the same candles and parameters always give the
/// same zone. An empty answer means "no signal", never a failure.
#[derive(Debug, Clone, Default)]
pub struct ImpulseZoneExtractor {
    params: ExtractorParams,
}

impl ImpulseZoneExtractor {
    pub fn new(params: ExtractorParams) -> Self {
        Self { params }
    }

    pub fn extract(
        &self,
        candles: &[Candle],
        symbol: &str,
        fetch_date: NaiveDate,
        timeframe: Timeframe,
    ) -> Option<Zone> {
        if candles.len() < MIN_CANDLES {
            debug!(
                "{}: {} candles on {}, need {}",
                symbol,
                candles.len(),
                fetch_date,
                MIN_CANDLES
            );
            return None;
        }

        let atr = average_true_range(candles);
        let impulse = self.find_major_impulse(candles, atr)?;
        debug!(
            "{}: {} impulse {}..{} move={:.4} atr={:.4}",
            symbol, impulse.direction, impulse.start_idx, impulse.end_idx, impulse.net_move, atr
        );

        let window = self.find_origin_zone(candles, impulse.start_idx)?;
        if !validate_zone(candles, &window, &impulse) {
            debug!(
                "{}: origin {:.4}-{:.4} rejected, price did not leave the range",
                symbol, window.low, window.high
            );
            return None;
        }

        let zone = Zone::new(
            symbol,
            fetch_date,
            timeframe,
            impulse.direction,
            window.low,
            window.high,
            impulse.strength,
        )
        .ok()?;

        Some(zone.with_impulse(
            candles[impulse.start_idx].timestamp,
            candles[impulse.end_idx].timestamp,
        ))
    }

    /// Largest net close-to-close move with a shallow pullback.
    ///
    /// Ties keep the first pair in scan order (ascending start, then end).
    pub fn find_major_impulse(&self, candles: &[Candle], atr: f64) -> Option<Impulse> {
        let n = candles.len();
        let threshold = self.params.atr_multiplier * atr;
        let mut best: Option<Impulse> = None;
        let mut max_move = 0.0;

        for i in 0..n.saturating_sub(IMPULSE_MIN_SPAN) {
            let price_start = candles[i].close;

            for j in (i + IMPULSE_MIN_SPAN)..(i + IMPULSE_MAX_SPAN).min(n) {
                let price_end = candles[j].close;
                let net_move = (price_end - price_start).abs();
                if net_move < threshold {
                    continue;
                }

                let span = &candles[i..=j];
                let direction = if price_end > price_start {
                    let lowest = span.iter().map(|c| c.low).fold(f64::INFINITY, f64::min);
                    if price_start - lowest > net_move * MAX_PULLBACK_RATIO {
                        continue;
                    }
                    ZoneType::Bullish
                } else {
                    let highest = span
                        .iter()
                        .map(|c| c.high)
                        .fold(f64::NEG_INFINITY, f64::max);
                    if highest - price_start > net_move * MAX_PULLBACK_RATIO {
                        continue;
                    }
                    ZoneType::Bearish
                };

                if net_move > max_move {
                    max_move = net_move;
                    best = Some(Impulse {
                        direction,
                        start_idx: i,
                        end_idx: j,
                        net_move,
                        strength: if net_move > HIGH_STRENGTH_ATR * atr {
                            ImpulseStrength::High
                        } else {
                            ImpulseStrength::Medium
                        },
                    });
                }
            }
        }

        best
    }

    /// Smallest compressed, balanced window ending right before `impulse_start`.
    pub fn find_origin_zone(
        &self,
        candles: &[Candle],
        impulse_start: usize,
    ) -> Option<OriginWindow> {
        let min = self.params.zone_candles_min;
        if impulse_start < min || impulse_start > candles.len() {
            return None;
        }
        let max = self.params.zone_candles_max.min(impulse_start);

        for lookback in min..=max {
            let window = &candles[impulse_start - lookback..impulse_start];

            let low = window.iter().map(|c| c.low).fold(f64::INFINITY, f64::min);
            let high = window
                .iter()
                .map(|c| c.high)
                .fold(f64::NEG_INFINITY, f64::max);
            let zone_range = high - low;
            let avg_candle_range =
                window.iter().map(Candle::range).sum::<f64>() / window.len() as f64;

            if zone_range >= avg_candle_range * COMPRESSION_RATIO {
                continue;
            }

            let first_close = window[0].close;
            let last_close = window[window.len() - 1].close;
            if (last_close - first_close).abs() < zone_range * BALANCE_RATIO {
                return Some(OriginWindow {
                    low,
                    high,
                    candle_count: lookback,
                });
            }
        }

        None
    }
}

/// 14-period mean true range over the last complete window; the day's mean
/// candle range when the series is shorter than that.
pub fn average_true_range(candles: &[Candle]) -> f64 {
    if candles.is_empty() {
        return 0.0;
    }
    if candles.len() < ATR_PERIOD {
        return candles.iter().map(Candle::range).sum::<f64>() / candles.len() as f64;
    }

    let true_ranges: Vec<f64> = candles
        .iter()
        .enumerate()
        .map(|(idx, c)| c.true_range(idx.checked_sub(1).map(|p| candles[p].close)))
        .collect();

    let recent = &true_ranges[true_ranges.len() - ATR_PERIOD..];
    recent.iter().sum::<f64>() / ATR_PERIOD as f64
}

/// The candle after the impulse must close at least two zone ranges away
/// from the zone midpoint.
pub fn validate_zone(candles: &[Candle], window: &OriginWindow, impulse: &Impulse) -> bool {
    let Some(after) = candles.get(impulse.end_idx + 1) else {
        return false;
    };
    let distance = (after.close - window.midpoint()).abs();
    distance >= window.range() * DEPARTURE_RANGES
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{bullish_day, series};

    fn mirrored(candles: &[Candle]) -> Vec<Candle> {
        candles
            .iter()
            .map(|c| {
                Candle::new(
                    c.timestamp,
                    200.0 - c.open,
                    200.0 - c.low,
                    200.0 - c.high,
                    200.0 - c.close,
                    c.volume,
                )
                .unwrap()
            })
            .collect()
    }

    fn fetch_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 27).unwrap()
    }

    #[test]
    fn test_extracts_bullish_origin_zone() {
        let candles = bullish_day();
        let zone = ImpulseZoneExtractor::default()
            .extract(&candles, "INFY", fetch_date(), Timeframe::Minute15)
            .expect("zone expected");

        assert_eq!(zone.symbol, "INFY");
        assert_eq!(zone.fetch_date, fetch_date());
        assert_eq!(zone.timeframe, Timeframe::Minute15);
        assert_eq!(zone.zone_type, ZoneType::Bullish);
        assert_eq!(zone.zone_low, 99.8);
        assert_eq!(zone.zone_high, 100.5);
        assert_eq!(zone.impulse_strength, ImpulseStrength::High);
        assert_eq!(zone.impulse_start_time, Some(candles[9].timestamp));
        assert_eq!(zone.impulse_end_time, Some(candles[16].timestamp));
    }

    #[test]
    fn test_extracts_bearish_zone_from_mirrored_day() {
        let candles = mirrored(&bullish_day());
        let zone = ImpulseZoneExtractor::default()
            .extract(&candles, "INFY", fetch_date(), Timeframe::Minute15)
            .expect("zone expected");

        assert_eq!(zone.zone_type, ZoneType::Bearish);
        assert_eq!(zone.zone_low, 200.0 - 100.5);
        assert_eq!(zone.zone_high, 200.0 - 99.8);
        assert_eq!(zone.impulse_start_time, Some(candles[9].timestamp));
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let candles = bullish_day();
        let extractor = ImpulseZoneExtractor::default();
        let first = extractor.extract(&candles, "INFY", fetch_date(), Timeframe::Minute15);
        for _ in 0..5 {
            assert_eq!(
                extractor.extract(&candles, "INFY", fetch_date(), Timeframe::Minute15),
                first
            );
        }
    }

    #[test]
    fn test_too_few_candles_is_empty() {
        let candles = bullish_day();
        let extractor = ImpulseZoneExtractor::default();
        assert!(extractor
            .extract(&candles[..19], "INFY", fetch_date(), Timeframe::Minute15)
            .is_none());
        assert!(extractor
            .extract(&[], "INFY", fetch_date(), Timeframe::Minute15)
            .is_none());
    }

    #[test]
    fn test_flat_day_has_no_impulse() {
        let rows = vec![(100.0, 100.5, 99.5, 100.0); 30];
        let candles = series(&rows);
        assert!(ImpulseZoneExtractor::default()
            .extract(&candles, "INFY", fetch_date(), Timeframe::Minute15)
            .is_none());
    }

    #[test]
    fn test_average_true_range() {
        let rows = vec![(100.0, 100.5, 99.5, 100.0); 20];
        assert_eq!(average_true_range(&series(&rows)), 1.0);

        // Short series falls back to the mean candle range
        let rows = [(10.0, 11.0, 10.0, 10.5), (10.5, 13.0, 10.0, 12.0)];
        assert_eq!(average_true_range(&series(&rows)), 2.0);
        assert_eq!(average_true_range(&[]), 0.0);
    }

    #[test]
    fn test_average_true_range_uses_latest_window_only() {
        let mut rows = vec![(100.0, 105.0, 95.0, 100.0); 6];
        rows.extend(vec![(100.0, 100.5, 99.5, 100.0); 14]);
        assert_eq!(average_true_range(&series(&rows)), 1.0);
    }

    #[test]
    fn test_impulse_tie_keeps_first_found() {
        let closes = [100.0, 100.0, 100.0, 103.0, 103.0, 103.0, 100.0, 100.0];
        let rows: Vec<_> = closes.iter().map(|&c| (c, c + 0.1, c - 0.1, c)).collect();
        let impulse = ImpulseZoneExtractor::default()
            .find_major_impulse(&series(&rows), 1.0)
            .unwrap();

        assert_eq!(impulse.direction, ZoneType::Bullish);
        assert_eq!((impulse.start_idx, impulse.end_idx), (0, 3));
        assert_eq!(impulse.strength, ImpulseStrength::High);
    }

    #[test]
    fn test_impulse_with_deep_pullback_is_discarded() {
        let rows = [
            (100.0, 100.1, 99.9, 100.0),
            (100.0, 100.0, 97.9, 98.0),
            (98.0, 101.1, 97.9, 101.0),
            (101.0, 104.1, 100.9, 104.0),
        ];
        assert!(ImpulseZoneExtractor::default()
            .find_major_impulse(&series(&rows), 1.0)
            .is_none());
    }

    #[test]
    fn test_impulse_strength_medium_below_two_atr() {
        let closes = [100.0, 100.0, 100.0, 101.8];
        let rows: Vec<_> = closes.iter().map(|&c| (c, c + 0.1, c - 0.1, c)).collect();
        let impulse = ImpulseZoneExtractor::default()
            .find_major_impulse(&series(&rows), 1.0)
            .unwrap();
        assert_eq!(impulse.strength, ImpulseStrength::Medium);
    }

    #[test]
    fn test_origin_zone_needs_room_before_impulse() {
        let candles = bullish_day();
        let extractor = ImpulseZoneExtractor::default();
        assert!(extractor.find_origin_zone(&candles, 1).is_none());

        let window = extractor.find_origin_zone(&candles, 9).unwrap();
        assert_eq!(window.candle_count, 2);
        assert_eq!((window.low, window.high), (99.8, 100.5));
    }

    #[test]
    fn test_origin_zone_grows_until_balanced() {
        // The two candles before index 4 trend; the three-candle window does not
        let rows = [
            (100.0, 100.6, 99.6, 100.2),
            (100.2, 100.4, 99.8, 100.3),
            (100.0, 100.3, 99.9, 100.0),
            (100.0, 100.6, 99.95, 100.5),
            (100.5, 103.0, 100.4, 102.9),
        ];
        let window = ImpulseZoneExtractor::default()
            .find_origin_zone(&series(&rows), 4)
            .unwrap();
        assert_eq!(window.candle_count, 3);
        assert_eq!((window.low, window.high), (99.8, 100.6));
    }

    #[test]
    fn test_origin_zone_rejects_expanding_range() {
        let rows = [
            (100.0, 100.2, 99.8, 100.0),
            (104.0, 104.2, 103.8, 104.0),
            (108.0, 108.2, 107.8, 108.0),
            (112.0, 112.2, 111.8, 112.0),
        ];
        assert!(ImpulseZoneExtractor::default()
            .find_origin_zone(&series(&rows), 3)
            .is_none());
    }

    #[test]
    fn test_validation_requires_decisive_departure() {
        let window = OriginWindow {
            low: 100.0,
            high: 101.0,
            candle_count: 2,
        };
        let impulse = Impulse {
            direction: ZoneType::Bullish,
            start_idx: 0,
            end_idx: 1,
            net_move: 5.0,
            strength: ImpulseStrength::High,
        };

        let far = series(&[
            (100.5, 101.0, 100.0, 100.5),
            (100.5, 106.0, 100.4, 105.5),
            (105.5, 106.0, 102.4, 102.5),
        ]);
        assert!(validate_zone(&far, &window, &impulse));

        let back_inside = series(&[
            (100.5, 101.0, 100.0, 100.5),
            (100.5, 106.0, 100.4, 105.5),
            (105.5, 105.6, 101.9, 102.0),
        ]);
        assert!(!validate_zone(&back_inside, &window, &impulse));

        // Impulse ending on the last candle leaves nothing to confirm with
        assert!(!validate_zone(&far[..2], &window, &impulse));
    }
}
