//! Network interface summary for the `sys net` command.
//!
//! Interface names and link states come from `/sys/class/net`; addresses
//! and the default route come from the `ip` tool when it is available.
//! DNS servers are read from `/etc/resolv.conf`.

use std::collections::BTreeMap;
use std::fs;

use duct::cmd;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interface {
    pub name: String,
    pub oper_state: String,
    pub addresses: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DefaultRoute {
    pub interface: Option<String>,
    pub gateway: Option<String>,
}

/// List interfaces sorted by name.
pub fn interfaces() -> Vec<Interface> {
    let mut addresses = BTreeMap::new();
    if which::which("ip").is_ok()
        && let Ok(output) = cmd!("ip", "-o", "addr", "show").read()
    {
        addresses = parse_ip_addr_output(&output);
    }

    let mut results = Vec::new();
    let Ok(entries) = fs::read_dir("/sys/class/net") else {
        return results;
    };

    for entry in entries.flatten() {
        let name = entry.file_name().to_string_lossy().to_string();
        let oper_state = fs::read_to_string(entry.path().join("operstate"))
            .map(|s| s.trim().to_string())
            .unwrap_or_else(|_| "unknown".to_string());
        let addrs = addresses.remove(&name).unwrap_or_default();
        results.push(Interface {
            name,
            oper_state,
            addresses: addrs,
        });
    }

    results.sort_by(|a, b| a.name.cmp(&b.name));
    results
}

/// Default route from `ip route`, if one exists.
pub fn default_route() -> Option<DefaultRoute> {
    if which::which("ip").is_err() {
        return None;
    }
    let output = cmd!("ip", "route").read().ok()?;
    parse_default_route(&output)
}

/// Nameservers from /etc/resolv.conf.
pub fn dns_servers() -> Vec<String> {
    fs::read_to_string("/etc/resolv.conf")
        .map(|s| parse_resolv_conf(&s))
        .unwrap_or_default()
}

/// Parse `ip -o addr show` lines: `2: eth0    inet 10.0.0.5/24 ...`
fn parse_ip_addr_output(output: &str) -> BTreeMap<String, Vec<String>> {
    let mut map: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for line in output.lines() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 4 {
            continue;
        }
        let name = fields[1].to_string();
        let addr = fields[3].to_string();
        map.entry(name).or_default().push(addr);
    }
    map
}

fn parse_default_route(output: &str) -> Option<DefaultRoute> {
    let line = output
        .lines()
        .find(|line| line.starts_with("default"))?;

    let fields: Vec<&str> = line.split_whitespace().collect();
    let mut route = DefaultRoute::default();
    for pair in fields.windows(2) {
        match pair[0] {
            "via" => route.gateway = Some(pair[1].to_string()),
            "dev" => route.interface = Some(pair[1].to_string()),
            _ => {}
        }
    }
    Some(route)
}

fn parse_resolv_conf(content: &str) -> Vec<String> {
    content
        .lines()
        .filter_map(|line| {
            let line = line.trim();
            let rest = line.strip_prefix("nameserver")?;
            rest.split_whitespace().next().map(|s| s.to_string())
        })
        .collect()
}
