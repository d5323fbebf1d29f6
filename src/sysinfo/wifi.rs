//! Wireless connection details for the `sys wifi` command.
//!
//! Status comes from `nmcli` when it is installed, falling back to
//! `iwconfig`. The signal/band/channel heuristics and the suggestion text
//! are pure functions over that status so they stay fixture-testable; only
//! the probing touches the system.

use duct::cmd;

/// Frequency band of a wireless link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Band {
    Band24,
    Band5,
    Band6,
}

impl Band {
    pub fn label(&self) -> &'static str {
        match self {
            Band::Band24 => "2.4 GHz band",
            Band::Band5 => "5 GHz band",
            Band::Band6 => "6 GHz band",
        }
    }
}

/// One snapshot of the active wireless connection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WifiStatus {
    pub device: String,
    pub ssid: String,
    pub signal_percent: i32,
    /// Raw quality text when only iwconfig data is available.
    pub quality_text: String,
    pub band: Option<Band>,
    pub frequency_mhz: i32,
    pub frequency_raw: String,
    pub channel: i32,
    pub rate_raw: String,
    pub security_raw: String,
}

/// Probe the active wireless connection, preferring NetworkManager.
pub fn status() -> Option<WifiStatus> {
    if which::which("nmcli").is_ok()
        && let Some(status) = status_from_nmcli()
    {
        return Some(status);
    }
    status_from_iwconfig()
}

fn status_from_nmcli() -> Option<WifiStatus> {
    let query = "nmcli -t -f ACTIVE,DEVICE,SSID,SIGNAL,FREQ,RATE,SECURITY dev wifi \
                 | grep '^yes:' 2>/dev/null";
    let output = cmd!("sh", "-c", query).read().ok()?;
    parse_nmcli_line(output.lines().next()?)
}

/// Parse one terse nmcli line: `yes:wlan0:HomeNet:72:5180 MHz:390 Mbit/s:WPA2`.
fn parse_nmcli_line(line: &str) -> Option<WifiStatus> {
    let fields = split_nmcli_fields(line);
    if fields.len() < 7 {
        return None;
    }

    let device = fields[1].clone();
    let ssid = fields[2].clone();
    let signal_percent = fields[3].trim().parse().unwrap_or(0);
    let frequency_raw = fields[4].clone();
    let rate_raw = fields[5].clone();
    let security_raw = fields[6].clone();

    let (band, frequency_mhz) = band_from_freq(&frequency_raw);
    let channel = channel_from_freq(frequency_mhz);

    Some(WifiStatus {
        device,
        ssid,
        signal_percent,
        quality_text: String::new(),
        band,
        frequency_mhz,
        frequency_raw,
        channel,
        rate_raw,
        security_raw,
    })
}

/// Split a terse-mode nmcli line on ':', honoring nmcli's backslash
/// escaping so an SSID containing a colon stays one field.
fn split_nmcli_fields(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut chars = line.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if let Some(escaped) = chars.next() {
                    current.push(escaped);
                }
            }
            ':' => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    fields.push(current);
    fields
}

fn status_from_iwconfig() -> Option<WifiStatus> {
    let output = cmd!("sh", "-c", "iwconfig 2>/dev/null").read().ok()?;
    let line = station_line(&output)?;
    let device = line.split_whitespace().next()?.to_string();

    let ssid = extract_between(line, "ESSID:\"", "\"").unwrap_or_default();
    let quality = extract_after(line, "Link Quality=").unwrap_or_default();
    let signal = extract_after(line, "Signal level=").unwrap_or_default();

    let per_iface = cmd!("sh", "-c", format!("iwconfig {device} 2>/dev/null"))
        .read()
        .unwrap_or_default();
    let frequency_raw = frequency_line(&per_iface).unwrap_or_default();

    let (band, frequency_mhz) = band_from_freq(&frequency_raw);
    let signal_percent = quality_to_percent(&quality);

    Some(WifiStatus {
        device,
        ssid,
        signal_percent,
        quality_text: format!("{quality} {signal}"),
        band,
        frequency_mhz,
        frequency_raw,
        channel: channel_from_freq(frequency_mhz),
        rate_raw: String::new(),
        security_raw: String::new(),
    })
}

/// First iwconfig line describing an associated station.
fn station_line(output: &str) -> Option<&str> {
    output.lines().map(str::trim).find(|line| {
        !line.is_empty() && line.contains("ESSID:") && !line.contains("ESSID:off/any")
    })
}

/// The `Frequency:...` value from per-interface iwconfig output.
fn frequency_line(output: &str) -> Option<String> {
    output
        .lines()
        .find(|l| l.contains("Frequency:"))
        .and_then(|l| extract_after(l, "Frequency:"))
}

/// Human label for a signal quality percentage in the range 0 to 100.
pub fn signal_quality_label(percent: i32) -> &'static str {
    match percent {
        i32::MIN..=0 => "no signal",
        1..25 => "very weak",
        25..50 => "weak",
        50..75 => "ok",
        _ => "strong",
    }
}

/// Parse a frequency string like "2412" or "2412 MHz" into a band and the
/// numeric MHz value.
pub fn band_from_freq(freq: &str) -> (Option<Band>, i32) {
    let Some(first) = freq.split_whitespace().next() else {
        return (None, 0);
    };
    let Ok(mhz) = first.parse::<i32>() else {
        return (None, 0);
    };

    let band = match mhz {
        2400..2500 => Some(Band::Band24),
        4900..5900 => Some(Band::Band5),
        5900..7125 => Some(Band::Band6),
        _ => None,
    };
    (band, mhz)
}

/// Map a frequency in MHz to a channel number. Covers the common 2.4, 5
/// and 6 GHz allocations; anything else maps to 0.
pub fn channel_from_freq(freq_mhz: i32) -> i32 {
    match freq_mhz {
        2412..=2472 => (freq_mhz - 2407) / 5,
        2484 => 14,
        5000..=5900 => (freq_mhz - 5000) / 5,
        5925..=7125 => (freq_mhz - 5950) / 5,
        _ => 0,
    }
}

/// Plain-text hint about the channel choice, if one applies.
pub fn channel_hint(band: Option<Band>, channel: i32) -> Option<&'static str> {
    match band {
        Some(Band::Band24) => match channel {
            1 | 6 | 11 => Some("(non overlapping channel)"),
            2..=13 => Some("(may overlap, 1 or 6 or 11 is often better)"),
            _ => None,
        },
        Some(Band::Band5) | Some(Band::Band6) => Some("(usually faster, shorter range)"),
        None => None,
    }
}

/// Convert a quality string like "40/70" to a percentage 0 to 100.
pub fn quality_to_percent(quality: &str) -> i32 {
    let quality = quality.trim();
    let Some((num, den)) = quality.split_once('/') else {
        return 0;
    };
    let (Ok(num), Ok(den)) = (num.trim().parse::<i32>(), den.trim().parse::<i32>()) else {
        return 0;
    };
    if den <= 0 {
        return 0;
    }
    (num as f64 / den as f64 * 100.0) as i32
}

/// Substring between two markers; None when either is missing.
fn extract_between<'a>(s: &'a str, start: &str, end: &str) -> Option<String> {
    let (_, rest) = s.split_once(start)?;
    let (inner, _) = rest.split_once(end)?;
    Some(inner.to_string())
}

/// Substring after a prefix, cut at the first space and trimmed.
fn extract_after(s: &str, prefix: &str) -> Option<String> {
    let (_, rest) = s.split_once(prefix)?;
    let value = rest.split(' ').next().unwrap_or(rest).trim();
    Some(value.to_string())
}

/// Average latency and packet loss from `ping -c 4 -w 5 8.8.8.8`.
pub fn latency_test() -> Option<(f64, f64)> {
    let output = cmd!("ping", "-c", "4", "-w", "5", "8.8.8.8")
        .stderr_to_stdout()
        .unchecked()
        .read()
        .ok()?;
    parse_ping_output(&output)
}

/// Pull "avg ms" and "% packet loss" out of ping's summary lines.
fn parse_ping_output(output: &str) -> Option<(f64, f64)> {
    let mut avg_ms = 0.0;
    let mut loss_pct = 0.0;

    for line in output.lines().map(str::trim) {
        if line.contains("packet loss") {
            for part in line.split(',').map(str::trim) {
                if part.contains("% packet loss")
                    && let Some(value) = part.split_whitespace().next()
                {
                    loss_pct = value.trim_end_matches('%').parse().unwrap_or(0.0);
                }
            }
        }
        if line.contains("min/avg/max")
            && let Some((_, values)) = line.split_once('=')
        {
            let nums: Vec<&str> = values.trim().split('/').collect();
            if nums.len() >= 2 {
                avg_ms = nums[1].parse().unwrap_or(0.0);
            }
        }
    }

    if avg_ms == 0.0 && loss_pct == 0.0 {
        return None;
    }
    Some((avg_ms, loss_pct))
}

/// User-facing suggestions based on signal, band, channel, security and
/// the optional latency figures. An empty line separates the latency
/// section when it is present.
pub fn suggestions(
    signal_percent: i32,
    band: Option<Band>,
    channel: i32,
    security_raw: &str,
    avg_ms: f64,
    loss_pct: f64,
) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    let push = |lines: &mut Vec<String>, text: &str| lines.push(text.to_string());

    match signal_percent {
        70.. => push(&mut lines, "Signal is strong, no changes needed here."),
        40..70 => push(
            &mut lines,
            "Signal is fair, if you see slowdowns try moving a little closer to the router.",
        ),
        1..40 => push(
            &mut lines,
            "Signal is weak, try moving closer or reducing walls and metal between you and the router.",
        ),
        _ => push(
            &mut lines,
            "Signal value is unknown, if you have issues check your distance to the router.",
        ),
    }

    if band == Some(Band::Band24) {
        if matches!(channel, 1 | 6 | 11) {
            push(
                &mut lines,
                "You are on 2.4 GHz, which has longer range but can be crowded.",
            );
            push(&mut lines, "Channel looks reasonable already.");
        } else if channel > 0 {
            push(&mut lines, "You are on 2.4 GHz which is often crowded.");
            push(
                &mut lines,
                "If performance is poor, consider channels 1, 6, or 11 to reduce overlap.",
            );
        }
    }

    if matches!(band, Some(Band::Band5) | Some(Band::Band6)) {
        push(
            &mut lines,
            "You are using a higher band which is usually faster but has shorter range.",
        );
        push(
            &mut lines,
            "If you have issues far from the router, try 2.4 GHz or move closer.",
        );
    }

    if security_raw.is_empty() || security_raw == "--" {
        push(
            &mut lines,
            "Network appears open. Anyone nearby can join. Use WPA2 or WPA3 if possible.",
        );
    } else if security_raw.contains("WEP") {
        push(
            &mut lines,
            "Network uses WEP which is very weak. Switch to WPA2 or WPA3.",
        );
    }

    if avg_ms > 0.0 || loss_pct > 0.0 {
        push(&mut lines, "");
        push(&mut lines, "Based on the latency test:");
        if loss_pct >= 5.0 {
            push(
                &mut lines,
                "Packet loss is noticeable. This can feel like pages hanging or video stutter.",
            );
        } else if avg_ms > 80.0 {
            push(&mut lines, "Latency is high. Games and calls may feel laggy.");
        } else {
            push(&mut lines, "Latency and loss look reasonable for most tasks.");
        }
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signal_quality_labels() {
        for (percent, want) in [
            (-5, "no signal"),
            (0, "no signal"),
            (1, "very weak"),
            (24, "very weak"),
            (25, "weak"),
            (49, "weak"),
            (50, "ok"),
            (74, "ok"),
            (75, "strong"),
            (100, "strong"),
            (110, "strong"),
        ] {
            assert_eq!(signal_quality_label(percent), want, "percent={percent}");
        }
    }

    #[test]
    fn band_from_frequency_strings() {
        for (input, want_band, want_mhz) in [
            ("2412", Some(Band::Band24), 2412),
            ("2412 MHz", Some(Band::Band24), 2412),
            ("5180", Some(Band::Band5), 5180),
            ("6000", Some(Band::Band6), 6000),
            ("", None, 0),
            ("abc", None, 0),
        ] {
            assert_eq!(band_from_freq(input), (want_band, want_mhz), "input={input:?}");
        }
    }

    #[test]
    fn channel_from_frequency() {
        assert_eq!(channel_from_freq(2412), 1);
        assert_eq!(channel_from_freq(2437), 6);
        assert_eq!(channel_from_freq(2462), 11);
        assert_eq!(channel_from_freq(2484), 14);
        assert_eq!(channel_from_freq(5180), 36);
        assert_eq!(channel_from_freq(0), 0);
    }

    #[test]
    fn channel_hints() {
        for ch in [1, 6, 11] {
            assert_eq!(
                channel_hint(Some(Band::Band24), ch),
                Some("(non overlapping channel)")
            );
        }
        assert_eq!(
            channel_hint(Some(Band::Band24), 3),
            Some("(may overlap, 1 or 6 or 11 is often better)")
        );
        assert_eq!(
            channel_hint(Some(Band::Band5), 36),
            Some("(usually faster, shorter range)")
        );
        assert_eq!(
            channel_hint(Some(Band::Band6), 5),
            Some("(usually faster, shorter range)")
        );
        assert_eq!(channel_hint(None, 0), None);
    }

    #[test]
    fn quality_strings_to_percent() {
        for (input, want) in [
            ("40/80", 50),
            ("35/70", 50),
            ("0/70", 0),
            ("70/70", 100),
            ("bad", 0),
            ("10/", 0),
            ("/10", 0),
            ("", 0),
        ] {
            assert_eq!(quality_to_percent(input), want, "input={input:?}");
        }
    }

    #[test]
    fn nmcli_line_parses_into_status() {
        let status =
            parse_nmcli_line("yes:wlan0:HomeNet:72:5180 MHz:390 Mbit/s:WPA2").unwrap();
        assert_eq!(status.device, "wlan0");
        assert_eq!(status.ssid, "HomeNet");
        assert_eq!(status.signal_percent, 72);
        assert_eq!(status.band, Some(Band::Band5));
        assert_eq!(status.frequency_mhz, 5180);
        assert_eq!(status.channel, 36);
        assert_eq!(status.rate_raw, "390 Mbit/s");
        assert_eq!(status.security_raw, "WPA2");
    }

    #[test]
    fn nmcli_line_unescapes_ssid_colons() {
        let status =
            parse_nmcli_line("yes:wlan0:Cafe\\:Guest:40:2437 MHz:144 Mbit/s:WPA2").unwrap();
        assert_eq!(status.ssid, "Cafe:Guest");
        assert_eq!(status.channel, 6);
    }

    #[test]
    fn short_nmcli_line_is_rejected() {
        assert_eq!(parse_nmcli_line("yes:wlan0:HomeNet"), None);
    }

    #[test]
    fn iwconfig_station_and_frequency_lines() {
        let output = "\
lo        no wireless extensions.

wlan0     IEEE 802.11  ESSID:\"HomeNet\"  Link Quality=40/70  Signal level=-52 dBm
          Mode:Managed  Frequency:5.18 GHz  Access Point: 11:22:33:44:55:66
";
        let line = station_line(output).unwrap();
        assert!(line.starts_with("wlan0"));
        assert_eq!(
            extract_between(line, "ESSID:\"", "\"").as_deref(),
            Some("HomeNet")
        );
        assert_eq!(
            extract_after(line, "Link Quality=").as_deref(),
            Some("40/70")
        );
        assert_eq!(frequency_line(output).as_deref(), Some("5.18"));
    }

    #[test]
    fn disassociated_iwconfig_has_no_station() {
        let output = "wlan0     IEEE 802.11  ESSID:off/any\n";
        assert_eq!(station_line(output), None);
    }

    #[test]
    fn ping_output_yields_latency_and_loss() {
        let output = "\
PING 8.8.8.8 (8.8.8.8) 56(84) bytes of data.
64 bytes from 8.8.8.8: icmp_seq=1 ttl=115 time=18.3 ms

--- 8.8.8.8 ping statistics ---
4 packets transmitted, 3 received, 25% packet loss, time 3004ms
rtt min/avg/max/mdev = 17.862/18.310/18.702/0.344 ms
";
        let (avg_ms, loss_pct) = parse_ping_output(output).unwrap();
        assert_eq!(avg_ms, 18.310);
        assert_eq!(loss_pct, 25.0);
    }

    #[test]
    fn unparseable_ping_output_is_none() {
        assert_eq!(parse_ping_output("ping: connect: Network is unreachable\n"), None);
    }

    #[test]
    fn suggestions_for_strong_signal() {
        let lines = suggestions(80, Some(Band::Band5), 36, "WPA2", 30.0, 0.0);
        assert!(lines.iter().any(|l| l.contains("Signal is strong")));
        assert!(lines.iter().any(|l| l.contains("higher band")));
        assert!(lines.iter().any(|l| l.contains("reasonable for most tasks")));
    }

    #[test]
    fn suggestions_for_weak_signal_wep_and_loss() {
        let lines = suggestions(10, Some(Band::Band24), 3, "WEP", 120.0, 10.0);
        assert!(lines.iter().any(|l| l.contains("Signal is weak")));
        assert!(lines.iter().any(|l| l.contains("WEP")));
        assert!(lines.iter().any(|l| l.contains("Packet loss is noticeable")));
    }

    #[test]
    fn suggestions_without_latency_have_no_latency_section() {
        let lines = suggestions(80, None, 0, "WPA3", 0.0, 0.0);
        assert!(!lines.iter().any(|l| l.contains("latency test")));
        assert!(!lines.contains(&String::new()));
    }

    #[test]
    fn open_network_gets_a_security_warning() {
        let lines = suggestions(80, None, 0, "--", 0.0, 0.0);
        assert!(lines.iter().any(|l| l.contains("Network appears open")));
    }
}
