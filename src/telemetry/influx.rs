//! InfluxDB v2 HTTP backend.
//!
//! Points are written with the line protocol at millisecond precision;
//! averages come back from a Flux query as CSV.

use std::time::Duration;

use reqwest::blocking::Client;
use tracing::debug;

use crate::error::{KickstartError, Result};

use super::{TelemetryConfig, TimingBackend, AVERAGE_WINDOW_DAYS, MEASUREMENT};

/// One line-protocol point.
#[derive(Debug, Clone, PartialEq)]
pub struct TimingPoint {
    pub measurement: String,
    pub tags: Vec<(String, String)>,
    pub fields: Vec<(String, i64)>,
    pub timestamp_ms: i64,
}

impl TimingPoint {
    /// Render as an InfluxDB line-protocol line.
    ///
    /// Tags with empty values are left out; integer fields get the `i` suffix.
    pub fn to_line_protocol(&self) -> String {
        let mut line = escape(&self.measurement, &[',', ' ']);

        for (key, value) in &self.tags {
            if value.is_empty() {
                continue;
            }
            line.push(',');
            line.push_str(&escape(key, &[',', '=', ' ']));
            line.push('=');
            line.push_str(&escape(value, &[',', '=', ' ']));
        }

        let fields: Vec<String> = self
            .fields
            .iter()
            .map(|(key, value)| format!("{}={}i", escape(key, &[',', '=', ' ']), value))
            .collect();
        line.push(' ');
        line.push_str(&fields.join(","));

        line.push(' ');
        line.push_str(&self.timestamp_ms.to_string());
        line
    }
}

fn escape(s: &str, special: &[char]) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if c == '\\' || special.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Percent-encode a URL query component.
fn encode_query(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char)
            }
            _ => out.push_str(&format!("%{:02X}", b)),
        }
    }
    out
}

fn flux_string(s: &str) -> String {
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Flux query computing the mean of every step field for a module/command.
pub fn average_query(bucket: &str, module: &str, command: &str) -> String {
    format!(
        "from(bucket: {bucket})\n  \
         |> range(start: -{days}d)\n  \
         |> filter(fn: (r) => r._measurement == {measurement})\n  \
         |> filter(fn: (r) => r.module == {module} and r.command == {command})\n  \
         |> group(columns: [\"_field\"])\n  \
         |> mean()",
        bucket = flux_string(bucket),
        days = AVERAGE_WINDOW_DAYS,
        measurement = flux_string(MEASUREMENT),
        module = flux_string(module),
        command = flux_string(command),
    )
}

/// Extract `(_field, _value)` pairs from a Flux CSV response.
///
/// Handles multiple tables (each with its own header row), annotation rows
/// starting with `#`, and CRLF line endings. Rows whose value does not
/// parse as a number are skipped.
pub fn parse_mean_csv(body: &str) -> Vec<(String, f64)> {
    let mut results = Vec::new();
    let mut columns: Option<(usize, usize)> = None;

    for raw in body.lines() {
        let line = raw.trim_end_matches('\r');
        if line.trim().is_empty() {
            columns = None;
            continue;
        }
        if line.starts_with('#') {
            continue;
        }

        let cells: Vec<&str> = line.split(',').collect();
        let field_idx = cells.iter().position(|c| *c == "_field");
        let value_idx = cells.iter().position(|c| *c == "_value");
        if let (Some(f), Some(v)) = (field_idx, value_idx) {
            columns = Some((f, v));
            continue;
        }

        let Some((f, v)) = columns else {
            continue;
        };
        let (Some(field), Some(value)) = (cells.get(f), cells.get(v)) else {
            continue;
        };
        if let Ok(mean) = value.parse::<f64>() {
            results.push((field.to_string(), mean));
        }
    }

    results
}

/// Timing backend talking to an InfluxDB v2 server.
pub struct InfluxBackend {
    client: Client,
    url: String,
    token: String,
    org: String,
    bucket: String,
}

impl InfluxBackend {
    /// Create a backend; all four settings must be present.
    pub fn from_config(config: &TelemetryConfig) -> Result<Self> {
        let (Some(url), Some(token), Some(org), Some(bucket)) = (
            config.url.as_deref(),
            config.token.as_deref(),
            config.org.as_deref(),
            config.bucket.as_deref(),
        ) else {
            return Err(KickstartError::ConfigValidationError {
                message: "telemetry requires url, token, org and bucket".to_string(),
            });
        };

        let client = Client::builder()
            .user_agent("kickstartds")
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(KickstartError::telemetry)?;

        Ok(Self {
            client,
            url: url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            org: org.to_string(),
            bucket: bucket.to_string(),
        })
    }

    fn write_url(&self) -> String {
        format!(
            "{}/api/v2/write?org={}&bucket={}&precision=ms",
            self.url,
            encode_query(&self.org),
            encode_query(&self.bucket)
        )
    }

    fn query_url(&self) -> String {
        format!("{}/api/v2/query?org={}", self.url, encode_query(&self.org))
    }
}

impl TimingBackend for InfluxBackend {
    fn write(&self, point: &TimingPoint) -> Result<()> {
        let body = point.to_line_protocol();
        debug!("Writing timing point: {}", body);

        let response = self
            .client
            .post(self.write_url())
            .header("Authorization", format!("Token {}", self.token))
            .header("Content-Type", "text/plain; charset=utf-8")
            .body(body)
            .send()
            .map_err(KickstartError::telemetry)?;

        if !response.status().is_success() {
            return Err(KickstartError::telemetry(format!(
                "HTTP {} writing timings",
                response.status()
            )));
        }
        Ok(())
    }

    fn query_averages(&self, module: &str, command: &str) -> Result<Vec<(String, f64)>> {
        let query = average_query(&self.bucket, module, command);

        let response = self
            .client
            .post(self.query_url())
            .header("Authorization", format!("Token {}", self.token))
            .header("Content-Type", "application/vnd.flux")
            .header("Accept", "application/csv")
            .body(query)
            .send()
            .map_err(KickstartError::telemetry)?;

        if !response.status().is_success() {
            return Err(KickstartError::telemetry(format!(
                "HTTP {} querying timings",
                response.status()
            )));
        }

        let body = response.text().map_err(KickstartError::telemetry)?;
        let averages = parse_mean_csv(&body);
        debug!(
            "Fetched {} historical timings for {} {}",
            averages.len(),
            module,
            command
        );
        Ok(averages)
    }
}
