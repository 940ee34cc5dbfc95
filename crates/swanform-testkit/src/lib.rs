// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use indexmap::IndexMap;
use std::path::PathBuf;
use std::sync::Arc;
use swanform_app::{Catalogue, ProjectOptions, ReleaseTable};

const STACK_NAMES: [&str; 6] = ["LCG", "CMSSW", "ATLAS", "LHCb", "FCC", "Geant4"];

const OPERATING_SYSTEMS: [&str; 5] = ["centos7", "slc6", "el8", "el9", "ubuntu2004"];
const ARCHITECTURES: [&str; 2] = ["x86_64", "aarch64"];
const COMPILERS: [&str; 6] = ["gcc8", "gcc9", "gcc11", "gcc13", "clang12", "clang16"];
const BUILD_TYPES: [&str; 2] = ["opt", "dbg"];

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

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }
}

/// Seeded generator of well-formed catalogues: every stack has at least one
/// release and every release at least one platform. Release keys are not
/// sorted, so tests notice when catalogue order gets lost.
#[derive(Debug, Clone)]
pub struct CatalogueFaker {
    rng: DeterministicRng,
    seed: u64,
}

impl CatalogueFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
            seed: normalized,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn catalogue(&mut self) -> Catalogue {
        let stack_count = 1 + self.rng.int_n(STACK_NAMES.len());
        let mut stacks = IndexMap::new();
        for offset in 0..stack_count {
            // Rotate so LCG is not always first.
            let name = STACK_NAMES[(offset + self.seed as usize) % STACK_NAMES.len()];
            stacks.insert(name.to_owned(), self.release_table(name));
        }
        Catalogue::new(stacks)
    }

    fn release_table(&mut self, stack: &str) -> ReleaseTable {
        let release_count = 1 + self.rng.int_n(5);
        let mut releases = ReleaseTable::new();
        while releases.len() < release_count {
            let release = self.release_name(stack);
            if releases.contains_key(&release) {
                continue;
            }
            let platforms = self.platforms();
            releases.insert(release, platforms);
        }
        releases
    }

    fn release_name(&mut self, stack: &str) -> String {
        let major = 90 + self.rng.int_n(15);
        match stack {
            "LCG" => {
                let suffix = ["", "a", "b", "c", "python3"][self.rng.int_n(5)];
                format!("{major}{suffix}")
            }
            "CMSSW" => format!(
                "CMSSW_{}_{}_{}",
                major - 80,
                self.rng.int_n(7),
                self.rng.int_n(3)
            ),
            other => format!("{}-{major}.{}", other.to_ascii_lowercase(), self.rng.int_n(10)),
        }
    }

    fn platforms(&mut self) -> Vec<String> {
        let count = 1 + self.rng.int_n(4);
        let mut platforms = Vec::with_capacity(count);
        while platforms.len() < count {
            let platform = format!(
                "{}-{}-{}-{}",
                self.pick(&ARCHITECTURES),
                self.pick(&OPERATING_SYSTEMS),
                self.pick(&COMPILERS),
                self.pick(&BUILD_TYPES)
            );
            if !platforms.contains(&platform) {
                platforms.push(platform);
            }
        }
        platforms
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[self.rng.int_n(items.len())]
    }
}

/// `{"LCG": {"97a": ["x86_64-centos7"], "97": ["x86_64-centos7", "x86_64-slc6"]}}`
pub fn scenario_catalogue() -> Catalogue {
    let mut catalogue = Catalogue::default();
    catalogue
        .insert_release("LCG", "97a", ["x86_64-centos7"])
        .insert_release("LCG", "97", ["x86_64-centos7", "x86_64-slc6"]);
    catalogue
}

pub fn blank_options(catalogue: Catalogue) -> ProjectOptions {
    ProjectOptions::new(Arc::new(catalogue))
}

pub fn catalogue_json(catalogue: &Catalogue) -> Result<String> {
    serde_json::to_string_pretty(catalogue).context("serialize catalogue fixture")
}

pub fn temp_catalogue_path(catalogue: &Catalogue) -> Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let path = dir.path().join("stacks.json");
    std::fs::write(&path, catalogue_json(catalogue)?)
        .with_context(|| format!("write catalogue fixture {}", path.display()))?;
    Ok((dir, path))
}

#[cfg(test)]
mod tests {
    use super::{CatalogueFaker, catalogue_json, scenario_catalogue};
    use anyhow::Result;
    use swanform_app::Catalogue;

    #[test]
    fn faker_is_deterministic_per_seed() {
        let first = CatalogueFaker::new(42).catalogue();
        let second = CatalogueFaker::new(42).catalogue();
        assert_eq!(first, second);
    }

    #[test]
    fn zero_seed_is_normalized() {
        assert_eq!(CatalogueFaker::new(0).seed(), 1);
    }

    #[test]
    fn generated_catalogues_are_valid() -> Result<()> {
        for seed in 1..64 {
            CatalogueFaker::new(seed).catalogue().validate()?;
        }
        Ok(())
    }

    #[test]
    fn fixture_json_round_trips_in_order() -> Result<()> {
        let json = catalogue_json(&scenario_catalogue())?;
        let parsed = Catalogue::from_json_str(&json)?;
        let releases = parsed.releases("LCG")?;
        assert_eq!(releases.keys().collect::<Vec<_>>(), ["97a", "97"]);
        Ok(())
    }
}
