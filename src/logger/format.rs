//! Log record format module
//!
//! Two renderings of the same record:
//! - `json` one object per line for the file sinks
//! - `simple` a `level: message {meta}` line for the console

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

/// Severity of a log record, most severe first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
}

impl LogLevel {
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "error" => Some(Self::Error),
            "warn" | "warning" => Some(Self::Warn),
            "info" => Some(Self::Info),
            "debug" => Some(Self::Debug),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
        }
    }

    /// Whether a record at `self` passes a sink configured for `threshold`
    pub fn passes(self, threshold: Self) -> bool {
        self <= threshold
    }
}

/// A single structured log record
#[derive(Debug, Clone, Serialize)]
pub struct LogRecord<'a> {
    pub level: LogLevel,
    pub message: &'a str,
    pub service: &'a str,
    #[serde(serialize_with = "serialize_timestamp")]
    pub timestamp: DateTime<Utc>,
}

impl<'a> LogRecord<'a> {
    pub fn new(level: LogLevel, message: &'a str, service: &'a str) -> Self {
        Self {
            level,
            message,
            service,
            timestamp: Utc::now(),
        }
    }

    /// JSON line for the file sinks
    pub fn to_json_line(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(
                r#"{{"level":"{}","message":"<unserializable>","service":"{}"}}"#,
                self.level.as_str(),
                self.service
            )
        })
    }

    /// Console line: `info: <message> {"service":"...","timestamp":"..."}`
    pub fn to_console_line(&self) -> String {
        let meta = serde_json::json!({
            "service": self.service,
            "timestamp": format_timestamp(&self.timestamp),
        });
        format!("{}: {} {meta}", self.level.as_str(), self.message)
    }
}

fn format_timestamp(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn serialize_timestamp<S: serde::Serializer>(
    time: &DateTime<Utc>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_timestamp(time))
}

/// Per-request audit event emitted before routing
#[derive(Debug, Clone)]
pub struct RequestEvent {
    pub time: DateTime<Utc>,
    pub method: String,
    /// Path plus query string, as received
    pub url: String,
    /// Second path segment (`/api/add` -> `add`)
    pub operation: Option<String>,
    pub num1: Option<String>,
    pub num2: Option<String>,
}

impl RequestEvent {
    pub fn new(method: &str, path: &str, query: Option<&str>) -> Self {
        let url = match query {
            Some(q) => format!("{path}?{q}"),
            None => path.to_string(),
        };
        let operation = path
            .split('/')
            .nth(2)
            .filter(|segment| !segment.is_empty())
            .map(ToString::to_string);

        Self {
            time: Utc::now(),
            method: method.to_string(),
            url,
            operation,
            num1: query.and_then(|q| crate::http::query_value(q, "num1")),
            num2: query.and_then(|q| crate::http::query_value(q, "num2")),
        }
    }

    /// `[<time>] GET /api/add?num1=1&num2=2 :::: add operation requested: 1 add 2`
    pub fn message(&self) -> String {
        let operation = self.operation.as_deref().unwrap_or("-");
        format!(
            "[{}] {} {} :::: {operation} operation requested: {} {operation} {}",
            format_timestamp(&self.time),
            self.method,
            self.url,
            self.num1.as_deref().unwrap_or("-"),
            self.num2.as_deref().unwrap_or("-"),
        )
    }
}
