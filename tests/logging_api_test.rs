//! Integration tests for the logger registry.

use std::fs;
use std::sync::Arc;

use kickstartds::logging::{LogLevel, LogRecord, LogSink, LoggerRegistry, SinkCounts, SinkKind};
use tempfile::TempDir;

struct NullSink;

impl LogSink for NullSink {
    fn kind(&self) -> SinkKind {
        SinkKind::Console
    }

    fn log(&self, _record: &LogRecord) {}
}

fn registry(temp: &TempDir) -> LoggerRegistry {
    LoggerRegistry::new(temp.path()).with_console_factory(|| Arc::new(NullSink) as Arc<dyn LogSink>)
}

#[test]
fn repeated_get_logger_keeps_one_console_sink() {
    let temp = TempDir::new().unwrap();
    let registry = registry(&temp);

    registry
        .get_logger("schema", LogLevel::Info, true, false, None)
        .unwrap();
    let logger = registry
        .get_logger("schema", LogLevel::Info, true, false, None)
        .unwrap();

    assert_eq!(
        logger.sink_counts(),
        SinkCounts {
            console: 1,
            file: 0,
            progress: 0
        }
    );
}

#[test]
fn file_logs_get_increasing_indices() {
    let temp = TempDir::new().unwrap();

    for _ in 0..3 {
        let registry = registry(&temp);
        let logger = registry
            .get_logger("tokens", LogLevel::Info, false, true, Some("compile"))
            .unwrap();
        logger.info("hello");
    }

    let mut names: Vec<String> = fs::read_dir(temp.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    names.sort();
    assert_eq!(
        names,
        [
            ".tokens-compilerc.1.log",
            ".tokens-compilerc.2.log",
            ".tokens-compilerc.log"
        ]
    );
    let first = fs::read_to_string(temp.path().join(".tokens-compilerc.log")).unwrap();
    assert!(first.contains("[kickstartDS: tokens/compile] info: hello"));
}

#[test]
fn dropping_the_file_flag_detaches_the_file_sink() {
    let temp = TempDir::new().unwrap();
    let registry = registry(&temp);

    registry
        .get_logger("cms", LogLevel::Debug, true, true, None)
        .unwrap();
    let logger = registry
        .get_logger("cms", LogLevel::Debug, true, false, None)
        .unwrap();

    assert_eq!(logger.sink_counts().file, 0);
    assert_eq!(logger.level(), LogLevel::Debug);
}
