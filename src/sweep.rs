//! Sweep-line span engine.
//!
//! Walks the rows spanned by a [`Raster`]'s profiles top to bottom. The rows
//! where some profile starts or ends ("turning rows") cut the walk into
//! bands with a constant set of active profiles. On each row the active
//! ascending profiles form the left-edge list and the descending ones the
//! right-edge list; both are sorted by x and merged, and the running winding
//! number decides under the [`FillingRule`] where spans open and close.
//!
//! Spans land in a [`CoverageMap`], which turns them into pixel coverage.
//! A profile whose tip overshoots into a row no centre line crosses marks
//! that row: it receives the spans of the adjacent sampled row as extended
//! samples, so the tip still fades in once the other axis is merged.

use crate::basics::FillingRule;
use crate::coverage::{CoverageMap, Sample};
use crate::fixed::Fixed;
use crate::raster::{Direction, Raster};

/// Counters reported by [`sweep`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SweepStats {
    /// Rows (or columns) visited.
    pub rows: usize,
    /// Spans produced by the winding walk.
    pub spans: usize,
    /// Overshoot rows given extended samples.
    pub extended: usize,
}

/// Sorted, de-duplicated rows where a profile starts or one past where it
/// ends.
pub fn turning_rows(raster: &Raster) -> Vec<i64> {
    let mut turns: Vec<i64> = raster
        .profiles()
        .iter()
        .flat_map(|p| [p.start, p.end()])
        .collect();
    turns.sort_unstable();
    turns.dedup();
    turns
}

/// Overshoot rows as `(source, target)` pairs, sorted by source: `target`
/// holds an edge tip and borrows the spans of the sampled row `source`.
/// Only targets in `lo..hi` are kept.
pub fn overshoot_rows(raster: &Raster, lo: i64, hi: i64) -> Vec<(i64, i64)> {
    let mut rows: Vec<(i64, i64)> = raster
        .profiles()
        .iter()
        .flat_map(|p| {
            let top = p.top_overshoot.then_some((p.start, p.start - 1));
            let bottom = p.bottom_overshoot.then_some((p.end() - 1, p.end()));
            top.into_iter().chain(bottom)
        })
        .filter(|&(_, target)| lo <= target && target < hi)
        .collect();
    rows.sort_unstable();
    rows.dedup();
    rows
}

/// Sweep every row of `raster` inside the map's sample limits and record
/// the spans in `map`.
pub fn sweep(raster: &Raster, rule: FillingRule, map: &mut CoverageMap) -> SweepStats {
    let mut stats = SweepStats::default();
    let profiles = raster.profiles();
    let vert = raster.is_vertical();
    let (row_lo, row_hi) = map.sample_limits(vert);
    if profiles.is_empty() || row_lo >= row_hi {
        return stats;
    }
    let (area_lo, area_hi) = map.limits(vert);
    let overshoots = overshoot_rows(raster, area_lo, area_hi);
    let mut next_overshoot = 0;

    let turns = turning_rows(raster);
    let mut waiting: Vec<usize> = (0..profiles.len()).collect();
    waiting.sort_by_key(|&i| std::cmp::Reverse(profiles[i].start));
    let mut active: Vec<usize> = Vec::new();

    let mut left: Vec<Fixed> = Vec::new();
    let mut right: Vec<Fixed> = Vec::new();
    let mut crossings: Vec<(Fixed, i32)> = Vec::new();
    let mut spans: Vec<(Fixed, Fixed)> = Vec::new();

    for band in turns.windows(2) {
        let (top, bottom) = (band[0], band[1]);
        active.retain(|&i| profiles[i].end() > top);
        while let Some(&i) = waiting.last() {
            if profiles[i].start > top {
                break;
            }
            active.push(i);
            waiting.pop();
        }
        if active.is_empty() {
            continue;
        }

        for row in top.max(row_lo)..bottom.min(row_hi) {
            stats.rows += 1;
            left.clear();
            right.clear();
            for &i in &active {
                let p = &profiles[i];
                if let Some(x) = raster.sample_at(p, row) {
                    match p.direction {
                        Direction::Ascending => left.push(x),
                        Direction::Descending => right.push(x),
                    }
                }
            }
            left.sort_unstable();
            right.sort_unstable();
            merge_crossings(&left, &right, &mut crossings);
            row_spans(&crossings, rule, &mut spans);
            stats.spans += spans.len();
            for &(x1, x2) in &spans {
                map.add_span(vert, row, x1, x2, Sample::Exact);
            }

            while overshoots.get(next_overshoot).is_some_and(|&(source, _)| source < row) {
                next_overshoot += 1;
            }
            while let Some(&(source, target)) = overshoots.get(next_overshoot) {
                if source != row {
                    break;
                }
                stats.extended += 1;
                for &(x1, x2) in &spans {
                    map.add_span(vert, target, x1, x2, Sample::Extended);
                }
                next_overshoot += 1;
            }
        }
    }
    stats
}

/// Merge two x-sorted edge lists into one list tagged with winding.
fn merge_crossings(left: &[Fixed], right: &[Fixed], out: &mut Vec<(Fixed, i32)>) {
    out.clear();
    let (mut i, mut j) = (0, 0);
    while i < left.len() || j < right.len() {
        let take_left = j >= right.len() || (i < left.len() && left[i] <= right[j]);
        if take_left {
            out.push((left[i], Direction::Ascending.winding()));
            i += 1;
        } else {
            out.push((right[j], Direction::Descending.winding()));
            j += 1;
        }
    }
}

/// Walk merged crossings and collect the spans inside the shape.
fn row_spans(crossings: &[(Fixed, i32)], rule: FillingRule, out: &mut Vec<(Fixed, Fixed)>) {
    out.clear();
    let mut winding = 0i32;
    let mut span_start = Fixed::ZERO;
    for &(x, w) in crossings {
        let was_inside = rule.is_inside(winding);
        winding = winding.saturating_add(w);
        let inside = rule.is_inside(winding);
        if !was_inside && inside {
            span_start = x;
        } else if was_inside && !inside && x > span_start {
            out.push((span_start, x));
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
