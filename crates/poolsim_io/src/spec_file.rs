//! Run configuration loading.
//!
//! Files ending in `.toml` are read as a serialized [`SimulationConfig`].
//! Anything else is read in the legacy fixed-order format:
//!
//! ```text
//! TimeSlots: 100
//! TimeStep: 0.01
//! Horizon: 1
//! GridSize: 200
//! NumberOfSmallParticles: 50
//! SmallParticleMass: 1
//! SmallParticleRadius: 1
//! NumberOfLargeParticles: 1
//! 1000 10 150 150
//! ```
//!
//! Each large particle line is `mass radius x y` in world coordinates.

use crate::error::{IoError, Result};
use poolsim_core::config::{LargeParticleSpec, SimulationConfig, SmallParticleConfig};
use std::path::Path;
use std::str::FromStr;

const KEYS: [&str; 8] = [
    "TimeSlots",
    "TimeStep",
    "Horizon",
    "GridSize",
    "NumberOfSmallParticles",
    "SmallParticleMass",
    "SmallParticleRadius",
    "NumberOfLargeParticles",
];

/// Reads, parses and validates the configuration at `path`.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<SimulationConfig> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| {
        IoError::FileSystem(e).with_context(format!("reading spec file {:?}", path))
    })?;

    let is_toml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
    let config = if is_toml {
        toml::from_str::<SimulationConfig>(&content)?
    } else {
        parse_spec(&content)?
    };

    config
        .validate()
        .map_err(|e| IoError::validation(format!("{e:#}")))?;
    tracing::debug!(?path, fingerprint = %config.fingerprint(), "loaded configuration");
    Ok(config)
}

/// Parses the legacy spec-file format. Does not validate value ranges.
pub fn parse_spec(content: &str) -> Result<SimulationConfig> {
    let mut lines = content
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty());

    let mut values = Vec::with_capacity(KEYS.len());
    for key in KEYS {
        let (number, line) = lines
            .next()
            .ok_or_else(|| IoError::config(format!("missing `{key}:`")))?;
        let value = line
            .strip_prefix(key)
            .and_then(|rest| rest.trim_start().strip_prefix(':'))
            .ok_or_else(|| IoError::parse(number, format!("expected `{key}:`, found `{line}`")))?;
        values.push((number, key, value.trim()));
    }

    let large_count: i64 = field(values[7])?;
    if large_count < 0 {
        return Err(IoError::config(format!(
            "NumberOfLargeParticles cannot be negative, got {large_count}"
        )));
    }

    let mut large = Vec::with_capacity(large_count as usize);
    for k in 0..large_count {
        let (number, line) = lines.next().ok_or_else(|| {
            IoError::config(format!(
                "expected {large_count} large particles, found {k}"
            ))
        })?;
        large.push(large_particle(number, line)?);
    }
    if let Some((number, _)) = lines.next() {
        tracing::warn!(line = number, "ignoring trailing lines in spec file");
    }

    Ok(SimulationConfig {
        time_slots: field(values[0])?,
        time_step: field(values[1])?,
        horizon: field(values[2])?,
        grid_size: field(values[3])?,
        small: SmallParticleConfig {
            count: field(values[4])?,
            mass: field(values[5])?,
            radius: field(values[6])?,
        },
        large,
        ..Default::default()
    })
}

fn field<T: FromStr>((line, key, value): (usize, &str, &str)) -> Result<T> {
    value
        .parse()
        .map_err(|_| IoError::parse(line, format!("invalid value `{value}` for {key}")))
}

fn large_particle(number: usize, line: &str) -> Result<LargeParticleSpec> {
    let parsed: Vec<f64> = line
        .split_whitespace()
        .map(str::parse)
        .collect::<std::result::Result<_, _>>()
        .map_err(|_| IoError::parse(number, format!("invalid large particle `{line}`")))?;
    match parsed.as_slice() {
        &[mass, radius, x, y] => Ok(LargeParticleSpec { mass, radius, x, y }),
        _ => Err(IoError::parse(
            number,
            format!("expected `mass radius x y`, found `{line}`"),
        )),
    }
}
