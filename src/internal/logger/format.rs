// src/internal/logger/format.rs

use chrono::NaiveTime;
use regex::Regex;
use std::sync::LazyLock;

use super::level::Level;

/// 24-hour clock with millisecond precision, e.g. `13:12:43.673`.
pub const TIME_FORMAT: &str = "%H:%M:%S%.3f";

static LINE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^(\d{2}:\d{2}:\d{2}\.\d{3}) - (.*?) - (DEBUG|INFO|WARNING|ERROR) - (.*)$")
        .expect("record line pattern is valid")
});

/// Renders `HH:MM:SS.mmm - <identity> - <LEVEL> - <message>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineFormatter;

impl LineFormatter {
    pub fn format(&self, time: NaiveTime, identity: &str, level: Level, message: &str) -> String {
        format!(
            "{} - {} - {} - {}",
            time.format(TIME_FORMAT),
            identity,
            level.as_str(),
            message
        )
    }
}

/// A formatted record read back from its line form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordLine {
    pub time: NaiveTime,
    pub identity: String,
    pub level: Level,
    pub message: String,
}

impl RecordLine {
    pub fn parse(line: &str) -> Option<RecordLine> {
        let caps = LINE_PATTERN.captures(line)?;
        let time = NaiveTime::parse_from_str(&caps[1], TIME_FORMAT).ok()?;
        let level = Level::parse(&caps[3])?;

        Some(RecordLine {
            time,
            identity: caps[2].to_string(),
            level,
            message: caps[4].to_string(),
        })
    }
}
