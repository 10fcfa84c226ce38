use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use rv_eval::*;
use rv_schedule::{Connection, Grid, Group, Schedule, ScheduleStep, Well};

const DAY: f64 = 86_400.0;

/// FIELD -> { PLAT { OP01, OP02 }, WI01 directly under FIELD's INJE group }
fn build_schedule() -> Schedule {
    let mut field = Group::new("FIELD", 0, None);
    field.groups.push("PLAT".to_owned());
    field.groups.push("INJE".to_owned());

    let mut plat = Group::new("PLAT", 1, Some("FIELD"));
    plat.wells.push("OP01".to_owned());
    plat.wells.push("OP02".to_owned());
    let mut inje = Group::new("INJE", 2, Some("FIELD"));
    inje.wells.push("WI01".to_owned());

    let mut op1 = Well::new("OP01", 0, "PLAT");
    op1.connections.push(Connection {
        global_index: 0,
        cf: 2.0e-12,
    });
    let op2 = Well::new("OP02", 1, "PLAT");
    let mut wi1 = Well::new("WI01", 2, "INJE");
    wi1.is_injector = true;
    wi1.connections.push(Connection {
        global_index: 3,
        cf: 1.0e-12,
    });

    let step = ScheduleStep::new(vec![op1, op2, wi1], vec![field, plat, inje]);
    Schedule::new(
        Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap(),
        vec![step],
    )
    .unwrap()
}

fn build_engine(out_tag: &str, requests: Vec<SummaryRequest>) -> (Summary, std::path::PathBuf) {
    let config = SummaryEngineConfig {
        requests,
        region_mapping: vec![1, 1, 2, 2],
        ..SummaryEngineConfig::default()
    };
    let dir = std::env::temp_dir().join(format!("rv_eval_engine_{out_tag}"));
    let _ = std::fs::remove_dir_all(&dir);
    let engine = Summary::new(
        &config,
        Grid::cartesian(2, 2, 1),
        build_schedule(),
        &dir,
        "CASE",
    );
    (engine, dir)
}

/// Producers flow oil and water; the injector pushes water. SI, simulator
/// sign convention (production negative).
fn snapshot(oil_si: f64, water_si: f64, inj_si: f64) -> StepSnapshot {
    let mut snap = StepSnapshot::default();

    let mut op1 = WellSolution::default();
    op1.rates.set(RateKind::Oil, -oil_si);
    op1.rates.set(RateKind::Water, -water_si);
    op1.connections.push(rv_eval::results::ConnectionSolution {
        global_index: 0,
        rates: {
            let mut r = rv_eval::results::Rates::default();
            r.set(RateKind::Oil, -oil_si);
            r
        },
        pressure: 2.0e7,
    });
    snap.wells.insert("OP01".to_owned(), op1);

    let mut op2 = WellSolution::default();
    op2.rates.set(RateKind::Oil, -oil_si / 2.0);
    snap.wells.insert("OP02".to_owned(), op2);

    let mut wi1 = WellSolution::default();
    wi1.rates.set(RateKind::Water, inj_si);
    snap.wells.insert("WI01".to_owned(), wi1);

    snap.single.insert("FPR".to_owned(), 2.5e7);
    snap.region.insert("RPR".to_owned(), vec![2.6e7, 2.4e7]);
    snap.block.insert(("BPR".to_owned(), 1), 2.7e7);

    snap
}

#[test]
fn field_rates_aggregate_all_wells() {
    let (engine, _dir) = build_engine(
        "field",
        vec![
            SummaryRequest::new("FOPR"),
            SummaryRequest::new("FWIR"),
            SummaryRequest::for_entity("GOPR", "PLAT"),
        ],
    );

    let mut st = SummaryState::new();
    engine.eval(&mut st, 1, DAY, &snapshot(1.0, 0.25, 0.5)).unwrap();

    // Metric output: m3/s * 86400 -> sm3/day.
    let fopr = st.get("FOPR").unwrap();
    assert!((fopr - 1.5 * DAY).abs() < 1e-6);
    let gopr = st.get_group_var("PLAT", "GOPR").unwrap();
    assert!((gopr - 1.5 * DAY).abs() < 1e-6);
    let fwir = st.get("FWIR").unwrap();
    assert!((fwir - 0.5 * DAY).abs() < 1e-6);
}

#[test]
fn totals_run_the_sum_of_rate_times_duration() {
    let (engine, _dir) = build_engine(
        "totals",
        vec![SummaryRequest::new("FOPR"), SummaryRequest::new("FOPT")],
    );

    let mut st = SummaryState::new();
    let rates = [1.0, 0.5, 2.0];
    let mut expected = 0.0;
    for (i, oil) in rates.iter().enumerate() {
        let secs = (i as f64 + 1.0) * DAY;
        engine
            .eval(&mut st, i as u32 + 1, secs, &snapshot(*oil, 0.0, 0.0))
            .unwrap();
        expected += st.get("FOPR").unwrap() * 1.0; // one day per step
    }

    let total = st.get("FOPT").unwrap();
    assert!(rv_core::nearly_equal(
        total,
        expected,
        rv_core::Tolerances::default()
    ));
}

#[test]
fn water_cut_stays_a_per_step_ratio() {
    let (engine, _dir) = build_engine("wct_steps", vec![SummaryRequest::new("FWCT")]);

    let mut st = SummaryState::new();
    for step in 1..=2u32 {
        engine
            .eval(&mut st, step, f64::from(step) * DAY, &snapshot(1.0, 1.0, 0.0))
            .unwrap();
        // 1.0 water against 1.5 oil, every step.
        assert!((st.get("FWCT").unwrap() - 0.4).abs() < 1e-12);
    }
}

#[test]
fn split_totals_accumulate_like_their_parents() {
    let (engine, _dir) = build_engine(
        "split_totals",
        vec![SummaryRequest::new("FOPTS"), SummaryRequest::new("FOPT")],
    );

    let mut st = SummaryState::new();
    for step in 1..=2u32 {
        let mut snap = snapshot(1.0, 0.0, 0.0);
        snap.wells
            .get_mut("OP01")
            .unwrap()
            .rates
            .set(RateKind::VaporizedOil, -0.25);
        engine
            .eval(&mut st, step, f64::from(step) * DAY, &snap)
            .unwrap();
    }

    // 0.25 m3/s of vaporized oil over two one-day steps.
    let fopts = st.get("FOPTS").unwrap();
    assert!((fopts - 2.0 * 0.25 * DAY).abs() < 1e-6);
    // The parent total covers both wells' oil (1.0 + 0.5 m3/s).
    let fopt = st.get("FOPT").unwrap();
    assert!((fopt - 2.0 * 1.5 * DAY).abs() < 1e-6);
}

#[test]
fn direct_tables_and_ratio_vectors() {
    let (engine, _dir) = build_engine(
        "tables",
        vec![
            SummaryRequest::new("FPR"),
            SummaryRequest::for_number("RPR", 2),
            SummaryRequest::for_number("BPR", 1),
            SummaryRequest::new("FWCT"),
        ],
    );

    let mut st = SummaryState::new();
    engine.eval(&mut st, 1, DAY, &snapshot(1.0, 1.0, 0.0)).unwrap();

    // Pascals -> bar under the metric convention.
    assert!((st.get("FPR").unwrap() - 250.0).abs() < 1e-9);
    assert!((st.get("RPR:2").unwrap() - 240.0).abs() < 1e-9);
    assert!((st.get("BPR:1").unwrap() - 270.0).abs() < 1e-9);

    // Water cut of 1.0 water vs 1.5 oil production.
    let wct = st.get("FWCT").unwrap();
    assert!((wct - 1.0 / 2.5).abs() < 1e-12);
}

#[test]
fn unsupported_keywords_do_not_poison_the_run() {
    let (engine, _dir) = build_engine(
        "unsupported",
        vec![
            SummaryRequest::new("ZZZFOO").at("CASE.DATA", 12),
            SummaryRequest::new("FOPR"),
        ],
    );
    let mut st = SummaryState::new();
    engine.eval(&mut st, 1, DAY, &snapshot(1.0, 0.0, 0.0)).unwrap();
    assert!(st.has("FOPR"));
    assert!(!st.has("ZZZFOO"));
    // The unsupported vector is omitted from the output specification.
    assert!(!engine.keys().iter().any(|k| k == "ZZZFOO"));
}

#[derive(Clone, Default)]
struct LogSink(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

impl std::io::Write for LogSink {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for LogSink {
    type Writer = LogSink;

    fn make_writer(&'a self) -> LogSink {
        self.clone()
    }
}

#[test]
fn unsupported_keywords_warn_once_in_input_order() {
    let sink = LogSink::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(sink.clone())
        .with_ansi(false)
        .finish();

    tracing::subscriber::with_default(subscriber, || {
        let (_engine, _dir) = build_engine(
            "warnlog",
            vec![
                SummaryRequest::new("ZZZFOO").at("CASE.DATA", 12),
                SummaryRequest::new("ZZZFOO").at("CASE.DATA", 12),
                SummaryRequest::new("QQQBAR").at("CASE.DATA", 3),
            ],
        );
    });

    let log = String::from_utf8(sink.0.lock().unwrap().clone()).unwrap();
    assert!(log.contains("QQQBAR"));
    // The duplicate request collapses into one reported line.
    assert_eq!(log.matches("ZZZFOO").count(), 1);
    // Earlier input locations are listed first.
    assert!(log.find("QQQBAR").unwrap() < log.find("ZZZFOO").unwrap());
}

#[test]
fn written_stream_matches_state() {
    let (mut engine, dir) = build_engine(
        "stream",
        vec![
            SummaryRequest::new("FOPR"),
            SummaryRequest::for_entity("WOPR", "OP01"),
        ],
    );

    let mut st = SummaryState::new();
    for step in 1..=3u32 {
        let secs = f64::from(step) * DAY;
        engine
            .eval(&mut st, step, secs, &snapshot(1.0, 0.0, 0.0))
            .unwrap();
        engine.add_timestep(&st, step);
    }
    engine.write().unwrap();

    let spec = rv_output::read_specification(&dir.join("CASE.rsmspec.json")).unwrap();
    assert_eq!(spec.params[0].keyword, "TIME");
    assert_eq!(spec.params[0].unit, "DAYS");
    let wopr_slot = spec
        .params
        .iter()
        .position(|p| p.keyword == "WOPR")
        .unwrap();
    assert_eq!(spec.params[wopr_slot].wgname.as_deref(), Some("OP01"));

    let steps = rv_output::read_ministeps(&dir.join("CASE.ursmry")).unwrap();
    assert_eq!(steps.len(), 3);
    // TIME advances one day per step.
    assert_eq!(steps[0].params[0], 1.0);
    assert_eq!(steps[2].params[0], 3.0);
    let expect = (1.0 * DAY) as f32;
    assert_eq!(steps[1].params[wopr_slot], expect);
}

#[test]
fn two_identical_runs_produce_identical_bytes() {
    let run = |tag: &str| {
        let (mut engine, dir) = build_engine(tag, vec![SummaryRequest::new("FOPR")]);
        let mut st = SummaryState::new();
        for step in 1..=2u32 {
            engine
                .eval(&mut st, step, f64::from(step) * DAY, &snapshot(1.0, 0.5, 0.25))
                .unwrap();
            engine.add_timestep(&st, step);
        }
        engine.write().unwrap();
        std::fs::read(dir.join("CASE.ursmry")).unwrap()
    };
    assert_eq!(run("det_a"), run("det_b"));
}

proptest! {
    /// A cumulative vector is its rate vector integrated over the step,
    /// under any flow magnitude and step length.
    #[test]
    fn total_is_rate_times_duration(
        oil in 0.0f64..1.0e3,
        days in 1.0e-3f64..1.0e3,
    ) {
        let (engine, _dir) = build_engine(
            "prop",
            vec![SummaryRequest::new("FOPR"), SummaryRequest::new("FOPT")],
        );
        let mut st = SummaryState::new();
        engine
            .eval(&mut st, 1, days * DAY, &snapshot(oil, 0.0, 0.0))
            .unwrap();

        let rate = st.get("FOPR").unwrap();
        let total = st.get("FOPT").unwrap();
        prop_assert!((total - rate * days).abs() <= 1e-9 * total.abs().max(1.0));
    }
}
