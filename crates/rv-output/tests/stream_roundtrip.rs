use rv_core::UnitSystem;
use rv_output::*;

fn spec() -> SummarySpecification {
    SummarySpecification {
        start_time: "2025-01-01T00:00:00Z".to_string(),
        unit_convention: UnitSystem::Metric,
        grid_dims: [2, 2, 1],
        params: vec![
            ParamSpec {
                keyword: "TIME".to_string(),
                wgname: None,
                number: 0,
                unit: "DAYS".to_string(),
            },
            ParamSpec {
                keyword: "WOPR".to_string(),
                wgname: Some("OP01".to_string()),
                number: 0,
                unit: "SM3/DAY".to_string(),
            },
        ],
    }
}

#[test]
fn unified_stream_round_trip() {
    let dir = std::env::temp_dir().join("rv_output_unified");
    let _ = std::fs::remove_dir_all(&dir);

    let mut writer = SummaryWriter::new(&dir, "CASE", true, spec());

    let m = writer.next_mini_step(1);
    m.params[0] = 1.0;
    m.params[1] = 100.0;
    let m = writer.next_mini_step(1);
    m.params[0] = 2.0;
    m.params[1] = 90.0;
    let m = writer.next_mini_step(2);
    m.params[0] = 3.0;
    m.params[1] = 80.0;
    writer.flush().unwrap();

    let loaded_spec = read_specification(&writer.specification_path()).unwrap();
    assert_eq!(loaded_spec, spec());

    let steps = read_ministeps(&dir.join("CASE.ursmry")).unwrap();
    assert_eq!(steps.len(), 3);
    assert_eq!(steps[0].seq, 1);
    assert_eq!(steps[2].seq, 2);
    assert_eq!(steps[0].params, vec![1.0, 100.0]);
    assert_eq!(steps[2].params, vec![3.0, 80.0]);
    // Ids are assigned in claim order.
    assert_eq!(
        steps.iter().map(|m| m.id).collect::<Vec<_>>(),
        vec![0, 1, 2]
    );
}

#[test]
fn separate_mode_rolls_per_report_step() {
    let dir = std::env::temp_dir().join("rv_output_separate");
    let _ = std::fs::remove_dir_all(&dir);

    let mut writer = SummaryWriter::new(&dir, "CASE", false, spec());
    writer.next_mini_step(1).params[0] = 1.0;
    writer.next_mini_step(2).params[0] = 2.0;
    writer.flush().unwrap();

    let first = read_ministeps(&dir.join("CASE.s0001")).unwrap();
    let second = read_ministeps(&dir.join("CASE.s0002")).unwrap();
    assert_eq!(first.len(), 1);
    assert_eq!(second.len(), 1);
    assert_eq!(first[0].params[0], 1.0);
    assert_eq!(second[0].params[0], 2.0);
}

#[test]
fn seqhdr_written_once_per_report_step() {
    let dir = std::env::temp_dir().join("rv_output_seqhdr");
    let _ = std::fs::remove_dir_all(&dir);

    let mut writer = SummaryWriter::new(&dir, "CASE", true, spec());
    writer.next_mini_step(1);
    writer.next_mini_step(1);
    writer.next_mini_step(2);
    writer.flush().unwrap();

    let headers = read_records(&dir.join("CASE.ursmry"))
        .unwrap()
        .into_iter()
        .filter(|r| matches!(r, Record::SeqHdr(_)))
        .count();
    assert_eq!(headers, 2);
}

#[test]
fn flush_between_steps_appends_in_unified_mode() {
    let dir = std::env::temp_dir().join("rv_output_append");
    let _ = std::fs::remove_dir_all(&dir);

    let mut writer = SummaryWriter::new(&dir, "CASE", true, spec());
    writer.next_mini_step(1).params[0] = 1.0;
    writer.flush().unwrap();
    writer.next_mini_step(2).params[0] = 2.0;
    writer.flush().unwrap();

    let steps = read_ministeps(&dir.join("CASE.ursmry")).unwrap();
    assert_eq!(steps.len(), 2);
    assert_eq!(steps[1].seq, 2);
}
