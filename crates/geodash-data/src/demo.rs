// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use geodash_app::{Record, RecordId, RecordStatus};
use time::macros::{date, format_description};
use time::{Date, Duration};

pub const DEMO_COUNT: usize = 5500;
pub const DEMO_SEED: u64 = 2020;
pub const DEMO_EPOCH: Date = date!(2020 - 01 - 01);

const PREFIXES: [&str; 20] = [
    "Solar Farm",
    "Wind Turbine",
    "Hydro Plant",
    "Geothermal Station",
    "Pipeline",
    "Transmission Line",
    "Substation",
    "Reservoir",
    "Mining Site",
    "Oil Rig",
    "Gas Plant",
    "Power Grid",
    "Survey Point",
    "Weather Station",
    "Seismic Monitor",
    "Water Treatment",
    "Desalination Plant",
    "Nuclear Facility",
    "Biomass Plant",
    "Tidal Generator",
];

const LOCATIONS: [&str; 15] = [
    "North", "South", "East", "West", "Central", "Upper", "Lower", "Coastal", "Mountain",
    "Valley", "Desert", "Forest", "Plains", "Highland", "Lowland",
];

const REGIONS: [&str; 15] = [
    "Alpha", "Beta", "Gamma", "Delta", "Epsilon", "Zeta", "Eta", "Theta", "Iota", "Kappa",
    "Lambda", "Mu", "Nu", "Xi", "Omicron",
];

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: u64) -> u64 {
        if n <= 1 {
            return 0;
        }
        self.next_u64() % n
    }

    /// Uniform in `[0, 1)`.
    fn unit(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }
}

/// Seeded stand-in for a remote project feed. The same seed and `today`
/// always produce the same records.
#[derive(Debug, Clone)]
pub struct DemoGenerator {
    rng: DeterministicRng,
    today: Date,
}

impl DemoGenerator {
    pub fn new(seed: u64, today: Date) -> Self {
        Self {
            rng: DeterministicRng::new(seed),
            today,
        }
    }

    pub fn generate(&mut self, count: usize) -> Result<Vec<Record>> {
        (0..count)
            .map(|index| self.record(index))
            .collect::<Result<Vec<_>>>()
            .with_context(|| format!("generate {count} demo records"))
    }

    fn record(&mut self, index: usize) -> Result<Record> {
        let (latitude, longitude) = self.coordinates(index);
        let status = RecordStatus::ALL[self.rng.int_n(RecordStatus::ALL.len() as u64) as usize];
        let last_updated = self
            .date()
            .format(&format_description!("[year]-[month]-[day]"))
            .context("format demo date")?;
        Ok(Record {
            id: RecordId::new(format!("proj-{index:05}")),
            name: project_name(index),
            latitude,
            longitude,
            status: Some(status),
            last_updated,
        })
    }

    // Index-based spread around the globe plus up to five degrees of jitter.
    fn coordinates(&mut self, index: usize) -> (f64, f64) {
        let lat_base = -60.0 + (index % 120) as f64;
        let lng_base = -180.0 + (index.wrapping_mul(7) % 360) as f64;

        let lat = (lat_base + (self.rng.unit() - 0.5) * 10.0).clamp(-85.0, 85.0);
        let mut lng = lng_base + (self.rng.unit() - 0.5) * 10.0;
        if lng > 180.0 {
            lng -= 360.0;
        } else if lng < -180.0 {
            lng += 360.0;
        }
        (round6(lat), round6(lng))
    }

    fn date(&mut self) -> Date {
        let span = (self.today - DEMO_EPOCH).whole_days().max(0) as u64;
        let offset = self.rng.int_n(span + 1) as i64;
        DEMO_EPOCH
            .checked_add(Duration::days(offset))
            .unwrap_or(DEMO_EPOCH)
    }
}

/// `<prefix> <location> <region>-NNN`, cycling prefixes fastest.
pub fn project_name(index: usize) -> String {
    let prefix = PREFIXES[index % PREFIXES.len()];
    let location = LOCATIONS[(index / PREFIXES.len()) % LOCATIONS.len()];
    let region = REGIONS[(index / (PREFIXES.len() * LOCATIONS.len())) % REGIONS.len()];
    let number = index / (PREFIXES.len() * LOCATIONS.len() * REGIONS.len()) + 1;
    format!("{prefix} {location} {region}-{number:03}")
}

pub fn demo_records(count: usize, seed: u64, today: Date) -> Result<Vec<Record>> {
    DemoGenerator::new(seed, today).generate(count)
}

fn round6(value: f64) -> f64 {
    (value * 1_000_000.0).round() / 1_000_000.0
}
