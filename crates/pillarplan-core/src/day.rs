//! Day-keyed interval index over committed blocks.
//!
//! Built once per recompute pass from the day's [`TimeBlock`]s and then
//! queried read-only. All intervals are half-open `[start, end)`, so a
//! block ending at 09:30 and a block starting at 09:30 coexist. Volumes
//! are a personal day's worth of blocks, so queries are sorted linear
//! walks with early exit rather than anything clever.

use chrono::{DateTime, Duration, Utc};

use crate::block::TimeBlock;

/// Immutable per-pass index of occupied time.
#[derive(Debug, Clone, Default)]
pub struct DayIndex {
    /// Occupied spans, sorted by start.
    spans: Vec<(DateTime<Utc>, DateTime<Utc>)>,
}

impl DayIndex {
    /// Index the given blocks. Zero-duration blocks occupy nothing and
    /// are skipped.
    pub fn new(blocks: &[TimeBlock]) -> Self {
        let mut spans: Vec<(DateTime<Utc>, DateTime<Utc>)> = blocks
            .iter()
            .filter(|b| b.duration_minutes > 0)
            .map(|b| (b.start_time, b.end_time()))
            .collect();
        spans.sort_by_key(|(start, _)| *start);
        DayIndex { spans }
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    /// True if a block of `duration_minutes` starting at `start` would
    /// intersect any committed block.
    pub fn overlaps(&self, start: DateTime<Utc>, duration_minutes: u32) -> bool {
        self.overlaps_range(start, start + Duration::minutes(i64::from(duration_minutes)))
    }

    /// Half-open intersection test against `[start, end)`.
    pub fn overlaps_range(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        for (s, e) in &self.spans {
            if *s >= end {
                // Sorted by start: nothing later can reach back.
                break;
            }
            if start < *e {
                return true;
            }
        }
        false
    }

    /// First conflict-free start at or after `after`, advancing in
    /// `step_minutes` steps, such that the whole block finishes by
    /// `until`. `None` when the horizon is exhausted.
    pub fn next_free_slot(
        &self,
        after: DateTime<Utc>,
        duration_minutes: u32,
        until: DateTime<Utc>,
        step_minutes: u32,
    ) -> Option<DateTime<Utc>> {
        let step = Duration::minutes(i64::from(step_minutes.max(1)));
        let duration = Duration::minutes(i64::from(duration_minutes));
        let mut current = after;
        while current + duration <= until {
            if !self.overlaps_range(current, current + duration) {
                return Some(current);
            }
            current += step;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, h, m, 0).unwrap()
    }

    fn make_block(h: u32, m: u32, duration: u32) -> TimeBlock {
        TimeBlock::new("block", at(h, m), duration)
    }

    #[test]
    fn back_to_back_blocks_do_not_conflict() {
        let index = DayIndex::new(&[make_block(9, 0, 30)]);
        // [09:00, 09:30) vs [09:30, 10:00)
        assert!(!index.overlaps(at(9, 30), 30));
        assert!(index.overlaps(at(9, 29), 30));
        assert!(index.overlaps(at(8, 31), 30));
        assert!(!index.overlaps(at(8, 30), 30));
    }

    #[test]
    fn overlaps_range_walks_sorted_spans() {
        let index = DayIndex::new(&[
            make_block(14, 0, 60),
            make_block(9, 0, 30),
            make_block(11, 0, 45),
        ]);
        assert!(index.overlaps_range(at(11, 30), at(12, 0)));
        assert!(!index.overlaps_range(at(12, 0), at(14, 0)));
        assert!(index.overlaps_range(at(13, 30), at(14, 1)));
    }

    #[test]
    fn zero_duration_blocks_occupy_nothing() {
        let index = DayIndex::new(&[make_block(9, 0, 0)]);
        assert!(index.is_empty());
        assert!(!index.overlaps(at(9, 0), 30));
    }

    #[test]
    fn next_free_slot_steps_over_occupied_time() {
        let index = DayIndex::new(&[make_block(9, 0, 60)]);
        // From 09:00 in 30-minute steps: 09:00 busy, 09:30 busy, 10:00 free.
        let slot = index.next_free_slot(at(9, 0), 30, at(22, 0), 30);
        assert_eq!(slot, Some(at(10, 0)));
    }

    #[test]
    fn next_free_slot_requires_block_to_finish_by_horizon() {
        let index = DayIndex::new(&[]);
        assert_eq!(index.next_free_slot(at(21, 45), 30, at(22, 0), 30), None);
        assert_eq!(
            index.next_free_slot(at(21, 30), 30, at(22, 0), 30),
            Some(at(21, 30))
        );
    }

    #[test]
    fn next_free_slot_exhausts_fully_booked_day() {
        let index = DayIndex::new(&[make_block(9, 0, 13 * 60)]);
        assert_eq!(index.next_free_slot(at(9, 0), 30, at(22, 0), 30), None);
    }

    #[test]
    fn next_free_slot_on_empty_day_is_immediate() {
        let index = DayIndex::new(&[]);
        assert_eq!(
            index.next_free_slot(at(9, 17), 30, at(22, 0), 30),
            Some(at(9, 17))
        );
    }

    proptest! {
        /// The index agrees with a brute-force check against every block.
        #[test]
        fn overlap_matches_per_block_check(
            starts in proptest::collection::vec(0u32..780, 0..8),
            query_start in 0u32..800,
            query_len in 1u32..120,
        ) {
            let blocks: Vec<TimeBlock> = starts
                .iter()
                .map(|&m| make_block(8 + m / 60, m % 60, 25))
                .collect();
            let index = DayIndex::new(&blocks);
            let qs = at(8, 0) + Duration::minutes(i64::from(query_start));
            let qe = qs + Duration::minutes(i64::from(query_len));
            let expected = blocks.iter().any(|b| b.overlaps(qs, qe));
            prop_assert_eq!(index.overlaps_range(qs, qe), expected);
        }

        /// A slot the index hands out never intersects occupied time and
        /// always finishes by the horizon.
        #[test]
        fn returned_slots_are_genuinely_free(
            starts in proptest::collection::vec(0u32..600, 0..8),
            duration in 15u32..90,
        ) {
            let blocks: Vec<TimeBlock> = starts
                .iter()
                .map(|&m| make_block(8 + m / 60, m % 60, 45))
                .collect();
            let index = DayIndex::new(&blocks);
            let horizon = at(22, 0);
            if let Some(slot) = index.next_free_slot(at(8, 0), duration, horizon, 30) {
                let end = slot + Duration::minutes(i64::from(duration));
                prop_assert!(!index.overlaps_range(slot, end));
                prop_assert!(end <= horizon);
                prop_assert!(slot >= at(8, 0));
            }
        }
    }
}
