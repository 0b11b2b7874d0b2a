use crate::models::ChartDataPoint;
use ordered_float::OrderedFloat;
use std::collections::VecDeque;

pub const DEFAULT_CAPACITY: usize = 300;
pub const DEFAULT_COALESCE_MS: i64 = 500;

/// Bounded spread series for the chart. Samples that land within the
/// coalesce window of the previous one replace it instead of growing the
/// series; past `capacity` the oldest samples fall off the front.
#[derive(Debug, Clone)]
pub struct ChartBuffer {
    points: VecDeque<ChartDataPoint>,
    capacity: usize,
    coalesce_window_ms: i64,
}

impl ChartBuffer {
    pub fn new(capacity: usize, coalesce_window_ms: i64) -> Self {
        Self {
            points: VecDeque::with_capacity(capacity.min(DEFAULT_CAPACITY).saturating_add(1)),
            capacity: capacity.max(1),
            coalesce_window_ms,
        }
    }

    pub fn append(&mut self, point: ChartDataPoint) {
        match self.points.back_mut() {
            Some(last)
                if point.timestamp.saturating_sub(last.timestamp).saturating_abs()
                    < self.coalesce_window_ms =>
            {
                *last = point;
            }
            _ => self.points.push_back(point),
        }

        while self.points.len() > self.capacity {
            self.points.pop_front();
        }
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn latest(&self) -> Option<&ChartDataPoint> {
        self.points.back()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &ChartDataPoint> + ExactSizeIterator {
        self.points.iter()
    }

    /// Y-axis bounds: spread range padded by 10%, or ±0.001 when flat/empty.
    pub fn y_domain(&self) -> (f64, f64) {
        let min = self.points.iter().map(|p| OrderedFloat(p.spread)).min();
        let max = self.points.iter().map(|p| OrderedFloat(p.spread)).max();

        match (min, max) {
            (Some(min), Some(max)) => {
                let (min, max) = (min.into_inner(), max.into_inner());
                let range = max - min;
                let padding = if range == 0.0 { 0.001 } else { range * 0.1 };
                (min - padding, max + padding)
            }
            _ => (-0.001, 0.001),
        }
    }

    /// Point count read as minutes:seconds at roughly one sample a second.
    pub fn window_label(&self) -> String {
        let n = self.points.len();
        format!("{}:{:02}", n / 60, n % 60)
    }
}

impl Default for ChartBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, DEFAULT_COALESCE_MS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(ts: i64, spread: f64) -> ChartDataPoint {
        ChartDataPoint {
            timestamp: ts,
            spread,
            spread_percentage: spread / 10.0,
            time: String::new(),
        }
    }

    #[test]
    fn spaced_points_never_coalesce() {
        let mut buf = ChartBuffer::default();
        for i in 0..450 {
            buf.append(point(i * 500, i as f64));
            assert_eq!(buf.len(), ((i + 1) as usize).min(300));
        }
    }

    #[test]
    fn close_points_replace_last() {
        let mut buf = ChartBuffer::default();
        buf.append(point(1_000, 1.0));
        buf.append(point(2_000, 2.0));
        buf.append(point(2_499, 3.0));
        assert_eq!(buf.len(), 2);
        assert_eq!(buf.latest().unwrap().spread, 3.0);
        assert_eq!(buf.latest().unwrap().timestamp, 2_499);
    }

    #[test]
    fn backwards_clock_within_window_still_coalesces() {
        let mut buf = ChartBuffer::default();
        buf.append(point(10_000, 1.0));
        buf.append(point(9_700, 2.0));
        assert_eq!(buf.len(), 1);
        assert_eq!(buf.latest().unwrap().spread, 2.0);
    }

    #[test]
    fn full_buffer_evicts_oldest() {
        let mut buf = ChartBuffer::default();
        for i in 0..300 {
            buf.append(point(i * 1_000, i as f64));
        }
        assert_eq!(buf.len(), 300);

        buf.append(point(300_000, 300.0));
        assert_eq!(buf.len(), 300);
        assert_eq!(buf.iter().next().unwrap().spread, 1.0);
        assert_eq!(buf.latest().unwrap().spread, 300.0);
    }

    #[test]
    fn clear_empties() {
        let mut buf = ChartBuffer::new(5, 500);
        buf.append(point(0, 1.0));
        buf.append(point(1_000, 1.0));
        buf.clear();
        assert!(buf.is_empty());
        assert!(buf.latest().is_none());
    }

    #[test]
    fn configurable_limits() {
        let mut buf = ChartBuffer::new(3, 100);
        for ts in [0, 150, 300, 450] {
            buf.append(point(ts, 0.0));
        }
        assert_eq!(buf.len(), 3);
        assert_eq!(buf.iter().next().unwrap().timestamp, 150);
    }

    #[test]
    fn extreme_limits_do_not_overflow() {
        let mut buf = ChartBuffer::new(usize::MAX, i64::MAX);
        buf.append(point(i64::MIN, 1.0));
        buf.append(point(i64::MAX, 2.0));
        assert_eq!(buf.len(), 2);
        buf.append(point(i64::MAX - 1, 3.0));
        assert_eq!(buf.len(), 2);
        assert_eq!(buf.latest().unwrap().spread, 3.0);
    }

    #[test]
    fn y_domain_padding() {
        let mut buf = ChartBuffer::default();
        assert_eq!(buf.y_domain(), (-0.001, 0.001));

        buf.append(point(0, 2.0));
        let (lo, hi) = buf.y_domain();
        assert!((lo - 1.999).abs() < 1e-12 && (hi - 2.001).abs() < 1e-12);

        buf.append(point(1_000, -8.0));
        let (lo, hi) = buf.y_domain();
        assert!((lo + 9.0).abs() < 1e-9 && (hi - 3.0).abs() < 1e-9);
    }

    #[test]
    fn window_label_formats_minutes() {
        let mut buf = ChartBuffer::default();
        for i in 0..125 {
            buf.append(point(i * 1_000, 0.0));
        }
        assert_eq!(buf.window_label(), "2:05");
    }
}
