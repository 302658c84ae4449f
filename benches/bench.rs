// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use criterion::*;

use vnacal::{
    c64, compute_sweep,
    simulate::{Bridge, Dut},
    CalKind, CalibrationSet, FrequencySweep, SweepMode, VnaConfig,
};

fn calibrated(load: bool) -> (VnaConfig, CalibrationSet, Bridge) {
    let config = VnaConfig::default();
    let grid = config.grid().unwrap();
    let bridge = Bridge {
        gain: c64::new(0.4, 0.3),
        delay_s: 5e-9,
    };
    let mut cal = CalibrationSet::new();
    for kind in [CalKind::Open, CalKind::Short, CalKind::Load] {
        if kind == CalKind::Load && !load {
            continue;
        }
        // A slightly mismatched load keeps the bridge solve non-singular.
        let volts = bridge.cal_sweep(&grid, kind, 51.0);
        cal.capture(kind, &volts, &grid).unwrap();
    }
    (config, cal, bridge)
}

fn coefficients(c: &mut Criterion) {
    let (config, cal, _) = calibrated(false);
    let grid = config.grid().unwrap();
    let sweep = FrequencySweep::new(1_000_000, 30_000_000, config.data_width).unwrap();

    c.bench_function("derive coefficients", |b| {
        b.iter(|| cal.derive_coefficients(&grid, &sweep))
    });
}

fn reflection_sweep(c: &mut Criterion) {
    let dut = Dut {
        resistance: 20.0,
        inductance: 1e-6,
        capacitance: Some(100e-12),
    };

    let mut group = c.benchmark_group("reflection sweep");
    for load in [false, true] {
        let (config, cal, bridge) = calibrated(load);
        let grid = config.grid().unwrap();
        let sweep = FrequencySweep::new(1_000_000, 30_000_000, config.data_width).unwrap();
        let coeffs = cal.derive_coefficients(&grid, &sweep).unwrap();
        let volts = bridge.reflection_sweep(&sweep, &dut);
        let name = if load { "open short load" } else { "open short" };
        group.bench_function(name, |b| {
            b.iter(|| {
                compute_sweep(
                    SweepMode::Reflection,
                    &volts,
                    &grid,
                    &sweep,
                    &cal,
                    Some(&coeffs),
                )
            })
        });
    }
    group.finish();
}

criterion_group!(benches, coefficients, reflection_sweep);
criterion_main!(benches);
