//! Read-only system summaries.
//!
//! Everything here degrades to `"unknown"` rather than failing: these are
//! display helpers, and a missing proc file should never abort a command.

pub mod net;
pub mod wifi;

use std::fs;

use duct::cmd;

use crate::distro;

const UNKNOWN: &str = "unknown";

/// Basic facts about this machine for the `sys` command.
#[derive(Debug, Clone)]
pub struct SystemSummary {
    pub hostname: String,
    pub distro_name: String,
    pub kernel: String,
    pub uptime: String,
    pub load_average: String,
    pub memory: String,
}

pub fn summary() -> SystemSummary {
    let hostname = fs::read_to_string("/proc/sys/kernel/hostname")
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|_| UNKNOWN.to_string());

    let distro_name = distro::detect()
        .map(|d| d.display_name().to_string())
        .unwrap_or_else(|_| UNKNOWN.to_string());

    let kernel = cmd!("uname", "-r")
        .read()
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|_| UNKNOWN.to_string());

    let uptime = fs::read_to_string("/proc/uptime")
        .ok()
        .and_then(|s| parse_uptime_seconds(&s))
        .map(format_uptime)
        .unwrap_or_else(|| UNKNOWN.to_string());

    let load_average = fs::read_to_string("/proc/loadavg")
        .ok()
        .and_then(|s| parse_loadavg(&s))
        .unwrap_or_else(|| UNKNOWN.to_string());

    let memory = fs::read_to_string("/proc/meminfo")
        .ok()
        .and_then(|s| parse_meminfo(&s))
        .unwrap_or_else(|| UNKNOWN.to_string());

    SystemSummary {
        hostname,
        distro_name,
        kernel,
        uptime,
        load_average,
        memory,
    }
}

/// First field of /proc/uptime, truncated to whole seconds.
fn parse_uptime_seconds(content: &str) -> Option<u64> {
    let first = content.split_whitespace().next()?;
    let seconds: f64 = first.parse().ok()?;
    Some(seconds as u64)
}

fn format_uptime(total_seconds: u64) -> String {
    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3_600;
    let minutes = (total_seconds % 3_600) / 60;

    let mut parts = Vec::new();
    if days > 0 {
        parts.push(format!("{days} days"));
    }
    if hours > 0 {
        parts.push(format!("{hours} hours"));
    }
    parts.push(format!("{minutes} minutes"));
    parts.join(" ")
}

/// The three load figures from /proc/loadavg.
fn parse_loadavg(content: &str) -> Option<String> {
    let fields: Vec<&str> = content.split_whitespace().take(3).collect();
    if fields.len() < 3 {
        return None;
    }
    Some(fields.join(" "))
}

/// "used GiB / total GiB (percent)" from /proc/meminfo, using
/// MemAvailable the way `free` does.
fn parse_meminfo(content: &str) -> Option<String> {
    let mut total_kb: i64 = 0;
    let mut available_kb: i64 = 0;

    for line in content.lines() {
        if let Some(rest) = line.strip_prefix("MemTotal:") {
            total_kb = parse_kb(rest);
        } else if let Some(rest) = line.strip_prefix("MemAvailable:") {
            available_kb = parse_kb(rest);
        }
    }

    if total_kb <= 0 {
        return None;
    }

    let used_kb = total_kb - available_kb;
    let used_gib = used_kb as f64 / 1024.0 / 1024.0;
    let total_gib = total_kb as f64 / 1024.0 / 1024.0;
    let percent = used_kb as f64 / total_kb as f64 * 100.0;

    Some(format!("{used_gib:.1} GiB / {total_gib:.1} GiB ({percent:.0}%)"))
}

fn parse_kb(rest: &str) -> i64 {
    rest.split_whitespace()
        .next()
        .and_then(|v| v.parse().ok())
        .unwrap_or(0)
}
