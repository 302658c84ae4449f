// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::thread;

use approx::assert_abs_diff_eq;
use crossbeam_channel::bounded;

use super::*;
use crate::{engine::SweepMode, params::VnaConfig};

const MARKER: c64 = c64::new(0.0, 0.0);

fn counts(n: usize, value: f64) -> Vec<c64> {
    vec![c64::new(value, -value); n]
}

#[test]
fn test_framer_splits_on_markers() {
    let mut framer = SweepFramer::new();
    let mut block = counts(3, ADC_FULL_SCALE);
    block.push(MARKER);
    block.extend(counts(2, ADC_FULL_SCALE / 2.0));

    let frames = framer.push(&block);
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0], vec![c64::new(1.0, -1.0); 3]);
    assert_eq!(framer.pending_len(), 2);

    // The partial sweep carries over.
    let mut block = counts(1, ADC_FULL_SCALE / 2.0);
    block.push(MARKER);
    let frames = framer.push(&block);
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].len(), 3);
    assert_abs_diff_eq!(frames[0][2].re, 0.5);
    assert_eq!(framer.pending_len(), 0);
}

#[test]
fn test_framer_handles_many_markers_per_block() {
    let mut framer = SweepFramer::new();
    let mut block = vec![];
    for n in [4, 5, 6] {
        block.extend(counts(n, 100.0));
        block.push(MARKER);
    }
    // Consecutive markers don't make empty sweeps.
    block.push(MARKER);
    let frames = framer.push(&block);
    assert_eq!(
        frames.iter().map(|f| f.len()).collect::<Vec<_>>(),
        vec![4, 5, 6]
    );
    assert!(framer.push(&[]).is_empty());
}

#[test]
fn test_framer_only_treats_exact_zero_as_a_marker() {
    let mut framer = SweepFramer::new();
    let frames = framer.push(&[
        c64::new(0.0, 1.0),
        c64::new(1.0, 0.0),
        c64::new(-0.0, 0.0),
        c64::new(3.0, 0.0),
    ]);
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].len(), 2);
    assert_eq!(framer.pending_len(), 1);
}

#[test]
fn test_consume() {
    let config = VnaConfig {
        correct_delta: 100_000,
        max_freq: 1_000_000,
        data_width: 20,
    };
    let mut session = VnaSession::new(config).unwrap();
    session.set_mode(SweepMode::CalShort);
    let width = session.grid().width();
    assert_eq!(width, 14);

    let (tx, rx) = bounded(2);
    let mut seen = vec![];
    let stats = thread::scope(|s| {
        s.spawn(move || {
            // A good sweep split over two blocks, a short one, then a good one
            // followed by an unfinished one.
            let first = counts(10, 1000.0);
            let mut second = counts(width - 10, 1000.0);
            second.push(MARKER);
            second.extend(counts(5, 1000.0));
            second.push(MARKER);
            tx.send(first).unwrap();
            tx.send(second).unwrap();
            let mut third = counts(width, 2000.0);
            third.push(MARKER);
            third.extend(counts(3, 2000.0));
            tx.send(third).unwrap();
        });
        consume(rx, &mut session, |result| seen.push(result.mode))
    });

    assert_eq!(
        stats,
        FeedStats {
            accepted: 2,
            dropped: 1
        }
    );
    assert_eq!(seen, vec![SweepMode::CalShort; 2]);
    let short = session
        .calibration()
        .get(crate::calibration::CalKind::Short)
        .unwrap();
    assert_abs_diff_eq!(short.voltages()[0].re, 2000.0 / ADC_FULL_SCALE);
}
