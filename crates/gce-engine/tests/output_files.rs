//! Integration test: runs written through the text output formats.
//!
//! A completed run leaves a history file with the completion trailer
//! and a tracer table that reads back to the in-memory records. A run
//! that fails part-way leaves its rows without the trailer.

use std::fs;

use gce_core::{RunError, TimeFunction};
use gce_engine::{linspace_step, Phase, SingleZone, ZoneConfig};
use gce_output::{
    read_history, read_mdf, read_tracers, repair_function, write_mdf, HistoryTable,
    HistoryWriter, TracerWriter,
};
use gce_test_utils::FailingSink;

fn short() -> ZoneConfig {
    ZoneConfig::builder()
        .elements(&["o", "fe"])
        .clock(0.01, linspace_step(0.0, 1.0, 0.05))
        .n_stars(2)
        .build()
        .unwrap()
}

#[test]
fn completed_run_reads_back() {
    let mut sz = SingleZone::prepare(short()).unwrap();
    let mut history = HistoryWriter::new(Vec::new());
    sz.run(&mut history).unwrap();
    assert_eq!(history.rows_written(), 21);
    let mut tracers = TracerWriter::new(Vec::new());
    let out = sz.finalize(&mut tracers).unwrap();

    let table = read_history(history.into_inner().as_slice()).unwrap();
    assert!(table.complete);
    assert_eq!(table.rows.len(), out.history.len());
    assert_eq!(table.columns[..3], ["time", "mgas", "mstar"]);
    assert!(table.index_of("[fe/h]").is_some());
    let gas = table.column("mgas").unwrap();
    for (g, row) in gas.iter().zip(&out.history) {
        assert_eq!(*g, row.gas_mass);
    }

    let back = read_tracers(tracers.into_inner().as_slice()).unwrap();
    assert_eq!(back.len(), 200);
    assert_eq!(back, out.tracers);

    let mut mdf = Vec::new();
    write_mdf(&mut mdf, &out.mdf).unwrap();
    assert_eq!(read_mdf(mdf.as_slice()).unwrap(), out.mdf);
}

#[test]
fn history_repairs_into_a_driver() {
    let mut sz = SingleZone::prepare(short()).unwrap();
    let mut history = HistoryWriter::new(Vec::new());
    sz.run(&mut history).unwrap();
    let table = read_history(history.into_inner().as_slice()).unwrap();

    // Replay the recorded star formation history in SFR mode.
    let times = table.column("time").unwrap();
    let sfr = table.column("sfr").unwrap();
    let f = repair_function(&times, &sfr).unwrap();
    let mut replay = short();
    replay.mode = gce_engine::Mode::StarFormation;
    replay.driver = f.into_time_function();
    let mut sz = SingleZone::prepare(replay).unwrap();
    let mut again = HistoryWriter::new(Vec::new());
    sz.run(&mut again).unwrap();
    let table2 = read_history(again.into_inner().as_slice()).unwrap();
    let sfr2 = table2.column("sfr").unwrap();
    for (a, b) in sfr.iter().zip(&sfr2).skip(1) {
        assert!((a - b).abs() / a < 1e-6, "{a} vs {b}");
    }
}

#[test]
fn failed_run_leaves_incomplete_history() {
    let dir = std::env::temp_dir().join(format!("gce-engine-failed-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join("history.out");

    let mut config = short();
    config.driver = TimeFunction::custom(|t| if t < 0.215 { 9.1 } else { f64::NAN });
    let mut sz = SingleZone::prepare(config).unwrap();
    let mut history = HistoryWriter::create(&path).unwrap();
    match sz.run(&mut history) {
        Err(RunError::NonFinite { quantity, .. }) => assert_eq!(quantity, "mgas"),
        other => panic!("expected NonFinite, got {other:?}"),
    }
    assert_eq!(sz.phase(), Phase::Failed);
    drop(history);

    let table = HistoryTable::load(&path).unwrap();
    assert!(!table.complete);
    assert_eq!(table.rows.len(), 5);
    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn sink_failure_aborts_the_run() {
    let mut sz = SingleZone::prepare(short()).unwrap();
    let mut sink = FailingSink::new(4);
    match sz.run(&mut sink) {
        Err(RunError::Io(_)) => {}
        other => panic!("expected Io, got {other:?}"),
    }
    assert!(sink.inner.aborted());
    assert!(!sink.inner.finished());
    assert_eq!(sink.inner.rows().len(), 4);
    match sz.step(&mut sink) {
        Err(RunError::Failed) => {}
        other => panic!("expected Failed, got {other:?}"),
    }
}
