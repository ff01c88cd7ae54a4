use chrono::{Duration as ChronoDuration, Utc};
use emon_logging::{LogLevel, LogRecord, RotatingFileSink, RotationPolicy};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tempfile::tempdir;

fn open_sink(dir: &Path, max_size_bytes: u64, min_age: Duration) -> RotatingFileSink {
    RotatingFileSink::open(
        dir.join("error.log"),
        dir.join("lastLog.log"),
        RotationPolicy {
            max_size_bytes,
            min_age,
        },
        LogLevel::Error,
    )
    .unwrap()
}

fn fill(sink: &mut RotatingFileSink, bytes: usize) {
    let record = LogRecord::new(LogLevel::Error, "poller", "x".repeat(64));
    let line_len = record.format_line().len() + 1;
    for _ in 0..(bytes / line_len + 1) {
        sink.append(&record).unwrap();
    }
}

/// 首个 tick 只建立年龄基线,即使大小已超限也不轮转
#[test]
fn test_first_check_establishes_baseline_only() {
    let dir = tempdir().unwrap();
    let mut sink = open_sink(dir.path(), 16, Duration::from_secs(0));
    fill(&mut sink, 512);

    let rotated = sink.rotate_if_due(Utc::now()).unwrap();

    assert!(!rotated);
    assert!(sink.last_rotation().is_some());
    assert!(!dir.path().join("lastLog.log").exists());
}

/// 仅大小超限不轮转
#[test]
fn test_no_rotation_on_size_alone() {
    let dir = tempdir().unwrap();
    let mut sink = open_sink(dir.path(), 16, Duration::from_secs(3600));
    fill(&mut sink, 512);

    let baseline = Utc::now();
    assert!(!sink.rotate_if_due(baseline).unwrap());
    // 基线刚建立,大小虽超限但年龄门限未到
    let rotated = sink
        .rotate_if_due(baseline + ChronoDuration::seconds(10))
        .unwrap();

    assert!(!rotated);
    assert!(!dir.path().join("lastLog.log").exists());
}

/// 仅年龄超限不轮转
#[test]
fn test_no_rotation_on_age_alone() {
    let dir = tempdir().unwrap();
    let mut sink = open_sink(dir.path(), 1_000_000, Duration::from_secs(60));

    let baseline = Utc::now();
    assert!(!sink.rotate_if_due(baseline).unwrap());
    fill(&mut sink, 128);
    let rotated = sink
        .rotate_if_due(baseline + ChronoDuration::hours(2))
        .unwrap();

    assert!(!rotated);
    assert!(!dir.path().join("lastLog.log").exists());
}

/// 大小与年龄同时超限才轮转
#[test]
fn test_rotation_requires_both_gates() {
    let dir = tempdir().unwrap();
    let mut sink = open_sink(dir.path(), 64, Duration::from_secs(60));
    let baseline = Utc::now();
    assert!(!sink.rotate_if_due(baseline).unwrap());
    fill(&mut sink, 256);

    let rotated = sink
        .rotate_if_due(baseline + ChronoDuration::seconds(61))
        .unwrap();

    assert!(rotated);
    assert!(dir.path().join("lastLog.log").exists());
}

/// 轮转后:恰好一个保留代(旧内容)、一个空的活动文件,配置不变
#[test]
fn test_rotation_postconditions() {
    let dir = tempdir().unwrap();
    let mut sink = open_sink(dir.path(), 64, Duration::from_secs(0));
    let baseline = Utc::now();
    assert!(!sink.rotate_if_due(baseline).unwrap());
    fill(&mut sink, 256);
    let before = fs::read_to_string(dir.path().join("error.log")).unwrap();

    assert!(sink
        .rotate_if_due(baseline + ChronoDuration::seconds(1))
        .unwrap());

    let retained = fs::read_to_string(dir.path().join("lastLog.log")).unwrap();
    let active = fs::read_to_string(dir.path().join("error.log")).unwrap();
    assert_eq!(retained, before);
    assert!(active.is_empty());
    assert_eq!(sink.active_size(), 0);
    assert_eq!(sink.level(), LogLevel::Error);

    // 配置保持:轮转后低于级别的记录仍被过滤,达到级别的仍可写
    sink.append(&LogRecord::new(LogLevel::Info, "poller", "filtered"))
        .unwrap();
    sink.append(&LogRecord::new(LogLevel::Error, "poller", "kept"))
        .unwrap();
    sink.flush().unwrap();
    let active = fs::read_to_string(dir.path().join("error.log")).unwrap();
    assert!(!active.contains("filtered"));
    assert!(active.contains("kept"));
}

/// 保留代不存在时删除是良性情形,不报错
#[test]
fn test_missing_retained_generation_is_benign() {
    let dir = tempdir().unwrap();
    let mut sink = open_sink(dir.path(), 16, Duration::from_secs(0));
    fill(&mut sink, 64);

    assert!(!dir.path().join("lastLog.log").exists());
    sink.rotate().unwrap();
    assert!(dir.path().join("lastLog.log").exists());
}

/// 连续两次轮转只保留一个上代
#[test]
fn test_at_most_one_retained_generation() {
    let dir = tempdir().unwrap();
    let mut sink = open_sink(dir.path(), 16, Duration::from_secs(0));

    fill(&mut sink, 64);
    sink.rotate().unwrap();
    fill(&mut sink, 64);
    let marker = fs::read_to_string(dir.path().join("error.log")).unwrap();
    sink.rotate().unwrap();

    // 第二次轮转后,保留代是第一代被冲掉后的第二代内容
    let retained = fs::read_to_string(dir.path().join("lastLog.log")).unwrap();
    assert_eq!(retained, marker);
    let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
    assert_eq!(entries.len(), 2);
}

/// 时钟回拨时重建基线而不是立即轮转
#[test]
fn test_clock_step_back_rebuilds_baseline() {
    let dir = tempdir().unwrap();
    let mut sink = open_sink(dir.path(), 16, Duration::from_secs(0));
    fill(&mut sink, 64);

    let baseline = Utc::now();
    assert!(!sink.rotate_if_due(baseline).unwrap());
    let rotated = sink
        .rotate_if_due(baseline - ChronoDuration::hours(1))
        .unwrap();

    assert!(!rotated);
    assert!(!dir.path().join("lastLog.log").exists());
}
