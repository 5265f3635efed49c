//! Command-line parsing. Flags follow the single-dash `-name value` convention;
//! `--name`, `-name=value` and `--name=value` are accepted as well.

use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_IFACE: &str = "eth0";
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedArgs {
    pub pid: i64,
    pub name: Option<String>,
    pub output: String,
    pub iface: String,
    pub interval: Duration,
    pub header: bool,
    pub help: bool,
}

impl Default for ParsedArgs {
    fn default() -> Self {
        Self {
            pid: -1,
            name: None,
            output: String::new(),
            iface: DEFAULT_IFACE.to_string(),
            interval: DEFAULT_INTERVAL,
            header: false,
            help: false,
        }
    }
}

pub fn usage(prog: &str) -> String {
    format!(
        "Usage: {prog} -pid PID|-name NAME -output FILE [-iface IFACE] [-interval DURATION] [-header]\n\
         \n\
         \x20 -pid int          pid of process (default -1)\n\
         \x20 -name string      pick the single process whose name contains this\n\
         \x20 -output string    file path of result to write to\n\
         \x20 -iface string     network interface to monitor (default \"{DEFAULT_IFACE}\")\n\
         \x20 -interval dur     capture interval, must provide time unit, such as 5s (default 5s)\n\
         \x20 -header           print csv header first\n"
    )
}

pub fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<ParsedArgs, ConfigError> {
    let mut it = args.into_iter();
    let _ = it.next(); // program name
    let mut parsed = ParsedArgs::default();

    while let Some(arg) = it.next() {
        let Some(flag) = arg.strip_prefix("--").or_else(|| arg.strip_prefix('-')) else {
            return Err(ConfigError::UnknownFlag(arg.clone()));
        };
        let (key, inline) = match flag.split_once('=') {
            Some((k, v)) => (k, Some(v.to_string())),
            None => (flag, None),
        };
        let value = |it: &mut I::IntoIter| {
            inline
                .clone()
                .or_else(|| it.next())
                .ok_or_else(|| ConfigError::MissingValue(key.to_string()))
        };
        match key {
            "h" | "help" => parsed.help = true,
            "pid" => {
                let v = value(&mut it)?;
                parsed.pid = v.parse().map_err(|_| bad_value(key, &v))?;
            }
            "name" => parsed.name = Some(value(&mut it)?),
            "output" => parsed.output = value(&mut it)?,
            "iface" => parsed.iface = value(&mut it)?,
            "interval" => parsed.interval = parse_duration(&value(&mut it)?)?,
            "header" => {
                parsed.header = match inline.as_deref() {
                    None => true,
                    Some(v) => parse_bool(v).ok_or_else(|| bad_value(key, v))?,
                }
            }
            _ => return Err(ConfigError::UnknownFlag(arg.clone())),
        }
    }
    Ok(parsed)
}

fn bad_value(flag: &str, value: &str) -> ConfigError {
    ConfigError::BadValue {
        flag: flag.to_string(),
        value: value.to_string(),
    }
}

fn parse_bool(v: &str) -> Option<bool> {
    match v {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}

/// Parse a duration such as `5s`, `1500ms`, `1.5s` or `1m30s`. Every number
/// needs a unit; a bare `0` is the only exception.
pub fn parse_duration(s: &str) -> Result<Duration, ConfigError> {
    let bad = || ConfigError::BadDuration(s.to_string());
    if s == "0" {
        return Ok(Duration::ZERO);
    }
    if s.is_empty() {
        return Err(bad());
    }
    let mut rest = s;
    let mut total_nanos = 0f64;
    while !rest.is_empty() {
        let num_end = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .ok_or_else(bad)?;
        if num_end == 0 {
            return Err(bad());
        }
        let n: f64 = rest[..num_end].parse().map_err(|_| bad())?;
        rest = &rest[num_end..];
        let unit_end = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let scale = match &rest[..unit_end] {
            "ns" => 1.0,
            "us" | "µs" => 1e3,
            "ms" => 1e6,
            "s" => 1e9,
            "m" => 60e9,
            "h" => 3600e9,
            _ => return Err(bad()),
        };
        total_nanos += n * scale;
        rest = &rest[unit_end..];
    }
    if !total_nanos.is_finite() || total_nanos >= u64::MAX as f64 {
        return Err(bad());
    }
    Ok(Duration::from_nanos(total_nanos.round() as u64))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(v: &[&str]) -> Vec<String> {
        std::iter::once("procprobe")
            .chain(v.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn defaults() {
        let p = parse_args(args(&[])).unwrap();
        assert_eq!(p, ParsedArgs::default());
        assert_eq!(p.pid, -1);
        assert_eq!(p.iface, "eth0");
        assert_eq!(p.interval, Duration::from_secs(5));
        assert!(!p.header);
    }

    #[test]
    fn single_and_double_dash_forms() {
        let p = parse_args(args(&[
            "-pid", "1234", "--output", "/tmp/x.csv", "-iface=lo", "--interval=2s", "-header",
        ]))
        .unwrap();
        assert_eq!(p.pid, 1234);
        assert_eq!(p.output, "/tmp/x.csv");
        assert_eq!(p.iface, "lo");
        assert_eq!(p.interval, Duration::from_secs(2));
        assert!(p.header);
    }

    #[test]
    fn header_accepts_explicit_bool() {
        assert!(!parse_args(args(&["-header=false"])).unwrap().header);
        assert!(parse_args(args(&["-header=1"])).unwrap().header);
        assert!(parse_args(args(&["-header=maybe"])).is_err());
    }

    #[test]
    fn rejects_unknown_and_incomplete_flags() {
        assert!(matches!(
            parse_args(args(&["-port", "1"])),
            Err(ConfigError::UnknownFlag(f)) if f == "-port"
        ));
        assert!(matches!(
            parse_args(args(&["stray"])),
            Err(ConfigError::UnknownFlag(_))
        ));
        assert!(matches!(
            parse_args(args(&["-pid"])),
            Err(ConfigError::MissingValue(f)) if f == "pid"
        ));
        assert!(matches!(
            parse_args(args(&["-pid", "abc"])),
            Err(ConfigError::BadValue { .. })
        ));
    }

    #[test]
    fn help_flag() {
        assert!(parse_args(args(&["-h"])).unwrap().help);
        assert!(parse_args(args(&["--help"])).unwrap().help);
        assert!(usage("procprobe").contains("-interval"));
    }

    #[test]
    fn durations() {
        assert_eq!(parse_duration("5s").unwrap(), Duration::from_secs(5));
        assert_eq!(parse_duration("1500ms").unwrap(), Duration::from_millis(1500));
        assert_eq!(parse_duration("1m30s").unwrap(), Duration::from_secs(90));
        assert_eq!(parse_duration("2h").unwrap(), Duration::from_secs(7200));
        assert_eq!(parse_duration("1.5s").unwrap(), Duration::from_millis(1500));
        assert_eq!(parse_duration("0").unwrap(), Duration::ZERO);
        for bad in ["", "5", "s", "5x", "-5s", "1..2s", "5s3"] {
            assert!(parse_duration(bad).is_err(), "{bad:?} should not parse");
        }
    }
}
