//! End-to-end assembly tests over temporary directory fixtures.
//!
//! Each fixture builds the on-disk layout the assembler expects: one
//! directory per entity under a readings root, with monthly CSV files, plus
//! a target-times CSV.

use std::fs;
use std::path::Path;

use dataset_assembler::prelude::*;
use tempfile::TempDir;

fn write_file(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

/// One entity, one monthly file, 30-day lookback: only the in-window row
/// survives.
#[test]
fn trims_readings_to_the_lookback_window() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write_file(
        &root.join("readings/T1/2020-02.csv"),
        "timestamp,signal,value\n02/10/20 00:00:00,S1,3.2\n01/01/20 00:00:00,S1,9.9\n",
    );
    write_file(
        &root.join("target_times.csv"),
        "entity_id,cutoff_time,target\nT1,2020-02-15 00:00:00,1\n",
    );

    let assembler = DatasetAssembler::builder()
        .readings_dir(root.join("readings"))
        .lookback("30d")
        .build()
        .unwrap();
    let dataset = assembler
        .load(root.join("target_times.csv").as_path())
        .unwrap();

    assert_eq!(dataset.readings.len(), 1);
    let reading = &dataset.readings[0];
    assert_eq!(reading.entity_id, "T1");
    assert_eq!(reading.signal_id, "S1");
    assert_eq!(reading.value, 3.2);
    assert_eq!(dataset.target, Some(vec![1.0]));
    assert_eq!(dataset.target_times.len(), 1);
    assert!(dataset.target_times[0].target.is_none());
}

#[test]
fn signal_set_restricts_loaded_rows() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write_file(
        &root.join("readings/T1/2020-02.csv"),
        "timestamp,signal,value\n\
         02/10/20 00:00:00,S1,1.0\n\
         02/10/20 00:05:00,S2,2.0\n\
         02/11/20 00:00:00,S1,3.0\n",
    );
    write_file(
        &root.join("target_times.csv"),
        "entity_id,cutoff_time,target\nT1,2020-02-15 00:00:00,0\n",
    );

    let assembler = DatasetAssembler::builder()
        .readings_dir(root.join("readings"))
        .lookback("30d")
        .signals(["S1"])
        .build()
        .unwrap();
    let dataset = assembler
        .load(root.join("target_times.csv").as_path())
        .unwrap();

    assert_eq!(dataset.readings.len(), 2);
    assert!(dataset.readings.iter().all(|r| r.signal_id == "S1"));
}

#[test]
fn signal_set_can_come_from_a_file() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write_file(
        &root.join("readings/T1/2020-02.csv"),
        "timestamp,signal,value\n02/10/20 00:00:00,S1,1.0\n02/10/20 00:05:00,S2,2.0\n",
    );
    write_file(&root.join("signals.csv"), "signal_id\nS2\n");
    write_file(
        &root.join("target_times.csv"),
        "entity_id,cutoff_time,target\nT1,2020-02-15 00:00:00,0\n",
    );

    let assembler = DatasetAssembler::builder()
        .readings_dir(root.join("readings"))
        .lookback("30d")
        .signals_file(root.join("signals.csv"))
        .build()
        .unwrap();
    let dataset = assembler
        .load(root.join("target_times.csv").as_path())
        .unwrap();

    assert_eq!(dataset.readings.len(), 1);
    assert_eq!(dataset.readings[0].signal_id, "S2");
}

/// Two cutoffs for the same entity with overlapping windows: a reading
/// inside both appears exactly once.
#[test]
fn reading_in_overlapping_windows_appears_once() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write_file(
        &root.join("readings/T1/2020-02.csv"),
        "timestamp,signal,value\n02/10/20 00:00:00,S1,5.0\n",
    );
    write_file(
        &root.join("target_times.csv"),
        "entity_id,cutoff_time,target\n\
         T1,2020-02-15 00:00:00,1\n\
         T1,2020-02-20 00:00:00,0\n",
    );

    let assembler = DatasetAssembler::builder()
        .readings_dir(root.join("readings"))
        .lookback("30d")
        .build()
        .unwrap();
    let dataset = assembler
        .load(root.join("target_times.csv").as_path())
        .unwrap();

    assert_eq!(dataset.readings.len(), 1);
    assert_eq!(dataset.target, Some(vec![1.0, 0.0]));
}

#[test]
fn duplicate_target_pairs_are_rejected_regardless_of_row_order() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write_file(
        &root.join("readings/T1/2020-02.csv"),
        "timestamp,signal,value\n02/10/20 00:00:00,S1,1.0\n",
    );
    let assembler = DatasetAssembler::builder()
        .readings_dir(root.join("readings"))
        .build()
        .unwrap();

    for rows in [
        "T1,2020-02-15 00:00:00,1\nT1,2020-03-01 00:00:00,0\nT1,2020-02-15 00:00:00,0\n",
        "T1,2020-02-15 00:00:00,0\nT1,2020-02-15 00:00:00,1\nT1,2020-03-01 00:00:00,0\n",
    ] {
        let path = root.join("target_times.csv");
        write_file(&path, &format!("entity_id,cutoff_time,target\n{rows}"));
        let err = assembler.load(path.as_path()).unwrap_err();
        assert!(matches!(err, AssemblyError::DuplicateTarget { .. }));
    }
}

#[test]
fn window_endpoints_are_inclusive_end_to_end() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write_file(
        &root.join("readings/T1/2020-02.csv"),
        "timestamp,signal,value\n\
         01/16/20 00:00:00,S1,1.0\n\
         02/15/20 00:00:00,S1,2.0\n\
         02/15/20 00:00:01,S1,3.0\n",
    );
    write_file(
        &root.join("target_times.csv"),
        "entity_id,cutoff_time,target\nT1,2020-02-15 00:00:00,1\n",
    );

    let assembler = DatasetAssembler::builder()
        .readings_dir(root.join("readings"))
        .lookback("30d")
        .build()
        .unwrap();
    let dataset = assembler
        .load(root.join("target_times.csv").as_path())
        .unwrap();

    let values: Vec<f64> = dataset.readings.iter().map(|r| r.value).collect();
    assert_eq!(values, vec![1.0, 2.0]);
}

/// An entity whose files all fall outside the window hull yields an empty
/// readings table, not an error.
#[test]
fn entity_with_no_matching_files_yields_empty_readings() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write_file(
        &root.join("readings/T1/2019-06.csv"),
        "timestamp,signal,value\n06/10/19 00:00:00,S1,1.0\n",
    );
    write_file(
        &root.join("target_times.csv"),
        "entity_id,cutoff_time,target\nT1,2020-02-15 00:00:00,1\n",
    );

    let assembler = DatasetAssembler::builder()
        .readings_dir(root.join("readings"))
        .lookback("30d")
        .build()
        .unwrap();
    let dataset = assembler
        .load(root.join("target_times.csv").as_path())
        .unwrap();

    assert!(dataset.readings.is_empty());
    assert_eq!(dataset.target_times.len(), 1);
}

#[test]
fn empty_partition_directory_is_a_valid_result() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    fs::create_dir_all(root.join("readings/T1")).unwrap();
    write_file(
        &root.join("target_times.csv"),
        "entity_id,cutoff_time,target\nT1,2020-02-15 00:00:00,1\n",
    );

    let assembler = DatasetAssembler::builder()
        .readings_dir(root.join("readings"))
        .lookback("30d")
        .build()
        .unwrap();
    let dataset = assembler
        .load(root.join("target_times.csv").as_path())
        .unwrap();
    assert!(dataset.readings.is_empty());
}

#[test]
fn missing_partition_directory_fails_the_load() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    fs::create_dir_all(root.join("readings")).unwrap();
    write_file(
        &root.join("target_times.csv"),
        "entity_id,cutoff_time,target\nT1,2020-02-15 00:00:00,1\n",
    );

    let assembler = DatasetAssembler::builder()
        .readings_dir(root.join("readings"))
        .build()
        .unwrap();
    let err = assembler
        .load(root.join("target_times.csv").as_path())
        .unwrap_err();
    assert!(matches!(err, AssemblyError::Io { .. }));
}

/// A file outside the selected month range is never opened: its content is
/// deliberately unparseable and the load still succeeds.
#[test]
fn out_of_range_files_are_not_opened() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write_file(
        &root.join("readings/T1/2019-01.csv"),
        "not a readings file at all\njust text\n",
    );
    write_file(
        &root.join("readings/T1/2020-02.csv"),
        "timestamp,signal,value\n02/10/20 00:00:00,S1,1.0\n",
    );
    write_file(
        &root.join("target_times.csv"),
        "entity_id,cutoff_time,target\nT1,2020-02-15 00:00:00,1\n",
    );

    let assembler = DatasetAssembler::builder()
        .readings_dir(root.join("readings"))
        .lookback("30d")
        .build()
        .unwrap();
    let dataset = assembler
        .load(root.join("target_times.csv").as_path())
        .unwrap();
    assert_eq!(dataset.readings.len(), 1);
}

/// A selected file whose rows all miss the windows contributes nothing but
/// does not fail; the coarse filter may over-select.
#[test]
fn false_positive_file_selection_is_tolerated() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write_file(
        &root.join("readings/T1/2020-01.csv"),
        "timestamp,signal,value\n01/02/20 00:00:00,S1,9.9\n",
    );
    write_file(
        &root.join("readings/T1/2020-02.csv"),
        "timestamp,signal,value\n02/10/20 00:00:00,S1,1.0\n",
    );
    write_file(
        &root.join("target_times.csv"),
        "entity_id,cutoff_time,target\nT1,2020-02-15 00:00:00,1\n",
    );

    let assembler = DatasetAssembler::builder()
        .readings_dir(root.join("readings"))
        .lookback("30d")
        .build()
        .unwrap();
    let dataset = assembler
        .load(root.join("target_times.csv").as_path())
        .unwrap();

    // 2020-01.csv is inside the month hull but its single row predates the
    // window start of 2020-01-16.
    assert_eq!(dataset.readings.len(), 1);
    assert_eq!(dataset.readings[0].value, 1.0);
}

#[test]
fn entities_are_assembled_in_sorted_order() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write_file(
        &root.join("readings/B7/2020-02.csv"),
        "timestamp,signal,value\n02/10/20 00:00:00,S1,2.0\n",
    );
    write_file(
        &root.join("readings/A3/2020-02.csv"),
        "timestamp,signal,value\n02/10/20 00:00:00,S1,1.0\n",
    );
    // target rows deliberately list B7 first
    write_file(
        &root.join("target_times.csv"),
        "entity_id,cutoff_time,target\n\
         B7,2020-02-15 00:00:00,1\n\
         A3,2020-02-15 00:00:00,0\n",
    );

    let assembler = DatasetAssembler::builder()
        .readings_dir(root.join("readings"))
        .lookback("30d")
        .build()
        .unwrap();
    let dataset = assembler
        .load(root.join("target_times.csv").as_path())
        .unwrap();

    let entities: Vec<&str> = dataset
        .readings
        .iter()
        .map(|r| r.entity_id.as_str())
        .collect();
    assert_eq!(entities, vec!["A3", "B7"]);
    // target rows keep their input order
    assert_eq!(dataset.target_times[0].entity_id, "B7");
}

#[test]
fn no_lookback_loads_all_history_up_to_the_cutoff() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write_file(
        &root.join("readings/T1/1999-07.csv"),
        "timestamp,signal,value\n07/01/99 00:00:00,S1,1.0\n",
    );
    write_file(
        &root.join("readings/T1/2020-02.csv"),
        "timestamp,signal,value\n02/10/20 00:00:00,S1,2.0\n02/16/20 00:00:00,S1,3.0\n",
    );
    write_file(
        &root.join("target_times.csv"),
        "entity_id,cutoff_time,target\nT1,2020-02-15 00:00:00,1\n",
    );

    let assembler = DatasetAssembler::builder()
        .readings_dir(root.join("readings"))
        .build()
        .unwrap();
    let dataset = assembler
        .load(root.join("target_times.csv").as_path())
        .unwrap();

    let values: Vec<f64> = dataset.readings.iter().map(|r| r.value).collect();
    // the 1999 row is in; the row past the cutoff is out
    assert_eq!(values, vec![1.0, 2.0]);
}

#[test]
fn repeated_loads_produce_identical_output() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write_file(
        &root.join("readings/T1/2020-02.csv"),
        "timestamp,signal,value\n02/10/20 00:00:00,S1,1.0\n02/11/20 00:00:00,S2,2.0\n",
    );
    write_file(
        &root.join("target_times.csv"),
        "entity_id,cutoff_time,target\nT1,2020-02-15 00:00:00,1\n",
    );

    let assembler = DatasetAssembler::builder()
        .readings_dir(root.join("readings"))
        .lookback("30d")
        .build()
        .unwrap();
    let first = assembler
        .load(root.join("target_times.csv").as_path())
        .unwrap();
    let second = assembler
        .load(root.join("target_times.csv").as_path())
        .unwrap();
    assert_eq!(first, second);
}

#[test]
fn keep_target_leaves_labels_embedded() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write_file(
        &root.join("readings/T1/2020-02.csv"),
        "timestamp,signal,value\n02/10/20 00:00:00,S1,1.0\n",
    );
    write_file(
        &root.join("target_times.csv"),
        "entity_id,cutoff_time,target\nT1,2020-02-15 00:00:00,1\n",
    );

    let assembler = DatasetAssembler::builder()
        .readings_dir(root.join("readings"))
        .lookback("30d")
        .keep_target()
        .build()
        .unwrap();
    let dataset = assembler
        .load(root.join("target_times.csv").as_path())
        .unwrap();

    assert!(dataset.target.is_none());
    assert_eq!(dataset.target_times[0].target, Some(1.0));
}

#[test]
fn label_split_fails_when_the_label_column_is_absent() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write_file(
        &root.join("readings/T1/2020-02.csv"),
        "timestamp,signal,value\n02/10/20 00:00:00,S1,1.0\n",
    );
    write_file(
        &root.join("target_times.csv"),
        "entity_id,cutoff_time\nT1,2020-02-15 00:00:00\n",
    );

    let assembler = DatasetAssembler::builder()
        .readings_dir(root.join("readings"))
        .lookback("30d")
        .build()
        .unwrap();
    let err = assembler
        .load(root.join("target_times.csv").as_path())
        .unwrap_err();
    assert!(matches!(err, AssemblyError::MissingTarget { .. }));
}

#[test]
fn malformed_reading_timestamp_fails_the_whole_load() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write_file(
        &root.join("readings/T1/2020-02.csv"),
        "timestamp,signal,value\n02/10/20 00:00:00,S1,1.0\n2020-02-11 00:00:00,S1,2.0\n",
    );
    write_file(
        &root.join("target_times.csv"),
        "entity_id,cutoff_time,target\nT1,2020-02-15 00:00:00,1\n",
    );

    let assembler = DatasetAssembler::builder()
        .readings_dir(root.join("readings"))
        .lookback("30d")
        .build()
        .unwrap();
    let err = assembler
        .load(root.join("target_times.csv").as_path())
        .unwrap_err();
    assert!(matches!(err, AssemblyError::Timestamp { .. }));
}

#[test]
fn in_memory_target_table_is_accepted() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write_file(
        &root.join("readings/T1/2020-02.csv"),
        "timestamp,signal,value\n02/10/20 00:00:00,S1,1.0\n",
    );

    let cutoff = dataset_assembler::target::parse_cutoff("2020-02-15 00:00:00").unwrap();
    let targets = vec![TargetEvent::new("T1", cutoff).with_target(1.0)];

    let assembler = DatasetAssembler::builder()
        .readings_dir(root.join("readings"))
        .lookback("30d")
        .build()
        .unwrap();
    let dataset = assembler.load(targets).unwrap();
    assert_eq!(dataset.readings.len(), 1);
    assert_eq!(dataset.target, Some(vec![1.0]));
}

#[test]
fn readings_from_multiple_files_concatenate_in_file_order() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write_file(
        &root.join("readings/T1/2020-01.csv"),
        "timestamp,signal,value\n01/20/20 00:00:00,S1,1.0\n",
    );
    write_file(
        &root.join("readings/T1/2020-02.csv"),
        "timestamp,signal,value\n02/10/20 00:00:00,S1,2.0\n",
    );
    write_file(
        &root.join("target_times.csv"),
        "entity_id,cutoff_time,target\nT1,2020-02-15 00:00:00,1\n",
    );

    let assembler = DatasetAssembler::builder()
        .readings_dir(root.join("readings"))
        .lookback("30d")
        .build()
        .unwrap();
    let dataset = assembler
        .load(root.join("target_times.csv").as_path())
        .unwrap();

    let values: Vec<f64> = dataset.readings.iter().map(|r| r.value).collect();
    assert_eq!(values, vec![1.0, 2.0]);
}

#[cfg(feature = "parallel")]
#[test]
fn parallel_assembly_matches_serial_output() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    for (entity, month_value) in [("A1", 1.0), ("B2", 2.0), ("C3", 3.0)] {
        write_file(
            &root.join(format!("readings/{entity}/2020-02.csv")),
            &format!("timestamp,signal,value\n02/10/20 00:00:00,S1,{month_value}\n"),
        );
    }
    let mut target_rows = String::from("entity_id,cutoff_time,target\n");
    for entity in ["C3", "A1", "B2"] {
        target_rows.push_str(&format!("{entity},2020-02-15 00:00:00,1\n"));
    }
    write_file(&root.join("target_times.csv"), &target_rows);

    let serial = DatasetAssembler::builder()
        .readings_dir(root.join("readings"))
        .lookback("30d")
        .build()
        .unwrap()
        .load(root.join("target_times.csv").as_path())
        .unwrap();
    let parallel = DatasetAssembler::builder()
        .readings_dir(root.join("readings"))
        .lookback("30d")
        .parallel(true)
        .build()
        .unwrap()
        .load(root.join("target_times.csv").as_path())
        .unwrap();

    assert_eq!(serial, parallel);
}
