use chrono::{Duration as ChronoDuration, Utc};
use emon_logging::{LogHandle, LogLevel, LogRecord, RotatingFileSink, RotationPolicy};
use std::time::Duration;
use tempfile::tempdir;

fn main() {
    println!("=== emon 轮转日志示例 ===\n");

    let dir = tempdir().unwrap();
    let mut sink = RotatingFileSink::open(
        dir.path().join("error.log"),
        dir.path().join("lastLog.log"),
        RotationPolicy {
            max_size_bytes: 256,
            min_age: Duration::from_secs(0),
        },
        LogLevel::Error,
    )
    .unwrap();

    // 1. 建立年龄基线
    println!("1. 首次检查只建立基线");
    let baseline = Utc::now();
    let rotated = sink.rotate_if_due(baseline).unwrap();
    println!("   rotated = {rotated}\n");

    // 2. 写满活动文件
    println!("2. 写满活动文件");
    for i in 0..8 {
        sink.append(&LogRecord::new(
            LogLevel::Error,
            "demo",
            format!("synthetic failure #{i}"),
        ))
        .unwrap();
    }
    sink.flush().unwrap();
    println!("   active size = {} bytes\n", sink.active_size());

    // 3. 两个门限都越过后轮转
    println!("3. 门限检查");
    let rotated = sink
        .rotate_if_due(baseline + ChronoDuration::seconds(1))
        .unwrap();
    println!("   rotated = {rotated}");
    println!(
        "   retained exists = {}\n",
        dir.path().join("lastLog.log").exists()
    );

    // 4. 通过共享句柄继续写
    println!("4. 句柄注入");
    let log = LogHandle::new(sink, LogLevel::Debug);
    log.error("poller", "meter read failed: demo");
    log.flush().unwrap();
    println!(
        "   active size after handle write = {} bytes",
        log.active_size()
    );
}
