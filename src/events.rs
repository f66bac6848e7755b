//! Event identification: finds contiguous intervals where at least
//! `ntimeseries_start_threshold` series cross `start_threshold`, ending when
//! fewer than `ntimeseries_end_threshold` series still cross `end_threshold`
//! for at least `time_separator` seconds.
//!
//! Ported from `ts_identify_events`/`tsie_*` in the original, replacing the
//! C version's function-pointer state machine with a tagged `enum State`
//! dispatched by a `while` loop.

use crate::error::Result;
use crate::interval::{Interval, IntervalList};
use crate::series::Series;
use crate::series_list::SeriesList;
use crate::Timestamp;

/// Parameters for `identify_events`, mirroring `ts_identify_events`'s
/// argument list.
#[derive(Debug, Clone, Copy)]
pub struct EventConfig {
    /// If true, a series "crosses" a threshold by falling below it instead
    /// of rising above it.
    pub reverse: bool,
    pub start_threshold: f64,
    pub end_threshold: f64,
    pub ntimeseries_start_threshold: usize,
    pub ntimeseries_end_threshold: usize,
    /// Minimum gap, in seconds, required to close an event once it has
    /// dropped below `ntimeseries_end_threshold`.
    pub time_separator: Timestamp,
    pub range: Interval,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    NotInEvent,
    StartEvent,
    InEvent,
    MaybeEnd,
    End,
}

fn crossing_count(list: &SeriesList, ts: Timestamp, threshold: f64, reverse: bool) -> usize {
    let sign = if reverse { -1.0 } else { 1.0 };
    list.iter()
        .filter(|s| {
            s.get(ts)
                .map(|r| !r.null && sign * r.value > sign * threshold)
                .unwrap_or(false)
        })
        .count()
}

/// Builds the union of every input series' timestamps, trimmed to `range`.
fn build_union(list: &SeriesList, range: Interval) -> Result<Series> {
    let mut union = Series::new();
    for s in list.iter() {
        union.merge_anyway(s)?;
    }
    if union.is_empty() {
        return Ok(union);
    }

    match (union.next_index(range.start_ts), union.prev_index(range.end_ts)) {
        (Some(i1), Some(i2)) if i1 <= i2 => {
            let last = union.len() - 1;
            if i2 < last {
                union.delete_range(i2 + 1, last)?;
            }
            if i1 > 0 {
                union.delete_range(0, i1 - 1)?;
            }
        }
        _ => union.clear(),
    }
    Ok(union)
}

/// Identifies events across every series in `list`, per `config`.
pub fn identify_events(list: &SeriesList, config: &EventConfig) -> Result<IntervalList> {
    let union = build_union(list, config.range)?;
    let mut events = IntervalList::new();
    if union.is_empty() {
        return Ok(events);
    }

    let n = union.len();
    let mut cursor = 0usize;
    let mut state = State::NotInEvent;

    loop {
        match state {
            State::End => break,

            State::NotInEvent => {
                if cursor >= n {
                    state = State::End;
                    continue;
                }
                let ts = union.item(cursor).expect("cursor in range").ts;
                if crossing_count(list, ts, config.start_threshold, config.reverse)
                    >= config.ntimeseries_start_threshold
                {
                    tracing::trace!(ts, "event start detected");
                    state = State::StartEvent;
                } else {
                    cursor += 1;
                }
            }

            State::StartEvent => {
                let ts = union.item(cursor).expect("cursor in range").ts;
                events.append(ts, ts);
                state = State::InEvent;
            }

            State::InEvent => {
                if cursor >= n {
                    state = State::End;
                    continue;
                }
                let ts = union.item(cursor).expect("cursor in range").ts;
                if crossing_count(list, ts, config.end_threshold, config.reverse)
                    < config.ntimeseries_end_threshold
                {
                    state = State::MaybeEnd;
                } else {
                    events.set_last_end(ts);
                    cursor += 1;
                }
            }

            State::MaybeEnd => {
                if cursor >= n {
                    state = State::End;
                    continue;
                }
                let ts = union.item(cursor).expect("cursor in range").ts;
                if crossing_count(list, ts, config.end_threshold, config.reverse)
                    >= config.ntimeseries_end_threshold
                {
                    state = State::InEvent;
                    continue;
                }
                cursor += 1;
                if cursor >= n {
                    state = State::End;
                    continue;
                }
                let next_ts = union.item(cursor).expect("cursor in range").ts;
                let current_end = events.last_end().expect("event already started");
                if next_ts - current_end >= config.time_separator {
                    tracing::trace!(next_ts, current_end, "event closed");
                    state = State::NotInEvent;
                }
            }
        }
    }

    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series_from(pairs: &[(Timestamp, f64)]) -> Series {
        let mut s = Series::new();
        for &(ts, value) in pairs {
            s.append(ts, false, value, "").unwrap();
        }
        s
    }

    #[test]
    fn single_series_single_event() {
        let s = series_from(&[
            (0, 1.0),
            (10, 5.0),
            (20, 6.0),
            (30, 4.0),
            (40, 1.0),
        ]);
        let list = {
            let mut l = SeriesList::new();
            l.append(&s);
            l
        };
        let config = EventConfig {
            reverse: false,
            start_threshold: 4.5,
            end_threshold: 4.5,
            ntimeseries_start_threshold: 1,
            ntimeseries_end_threshold: 1,
            time_separator: 5,
            range: Interval::new(Timestamp::MIN, Timestamp::MAX),
        };
        let events = identify_events(&list, &config).unwrap();
        assert_eq!(events.len(), 1);
        let e = events.get(0).unwrap();
        assert_eq!(e.start_ts, 10);
        assert_eq!(e.end_ts, 20);
    }

    #[test]
    fn no_series_crosses_threshold_yields_no_events() {
        let s = series_from(&[(0, 1.0), (10, 2.0), (20, 1.0)]);
        let s2 = series_from(&[(0, 1.0), (10, 2.0), (20, 1.0)]);
        let mut list = SeriesList::new();
        list.append(&s);
        list.append(&s2);
        let config = EventConfig {
            reverse: false,
            start_threshold: 100.0,
            end_threshold: 100.0,
            ntimeseries_start_threshold: 2,
            ntimeseries_end_threshold: 2,
            time_separator: 5,
            range: Interval::new(Timestamp::MIN, Timestamp::MAX),
        };
        let events = identify_events(&list, &config).unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn short_dip_within_separator_does_not_split_event() {
        // value dips below end_threshold briefly but the next sample
        // arrives within the separator window: should be one event, not two.
        let s = series_from(&[
            (0, 1.0),
            (10, 5.0),
            (11, 1.0), // dip
            (12, 5.0), // recovers within the separator window (5s)
            (20, 1.0),
        ]);
        let mut list = SeriesList::new();
        list.append(&s);
        let config = EventConfig {
            reverse: false,
            start_threshold: 4.5,
            end_threshold: 4.5,
            ntimeseries_start_threshold: 1,
            ntimeseries_end_threshold: 1,
            time_separator: 5,
            range: Interval::new(Timestamp::MIN, Timestamp::MAX),
        };
        let events = identify_events(&list, &config).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events.get(0).unwrap().start_ts, 10);
        assert_eq!(events.get(0).unwrap().end_ts, 12);
    }

    #[test]
    fn reverse_mode_crosses_by_falling_below() {
        let s = series_from(&[(0, 10.0), (10, 1.0), (20, 10.0)]);
        let mut list = SeriesList::new();
        list.append(&s);
        let config = EventConfig {
            reverse: true,
            start_threshold: 5.0,
            end_threshold: 5.0,
            ntimeseries_start_threshold: 1,
            ntimeseries_end_threshold: 1,
            time_separator: 1,
            range: Interval::new(Timestamp::MIN, Timestamp::MAX),
        };
        let events = identify_events(&list, &config).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events.get(0).unwrap().start_ts, 10);
    }
}
