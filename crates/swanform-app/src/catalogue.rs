// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Releases of one stack, each mapped to its platforms. Insertion order is
/// catalogue order.
pub type ReleaseTable = IndexMap<String, Vec<String>>;

/// Read-only lookup table `stack -> release -> [platform]`.
///
/// Both map levels keep the order the entries were read in; the form picks
/// "first entry" defaults from that order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalogue {
    stacks: IndexMap<String, ReleaseTable>,
}

impl Catalogue {
    pub fn new(stacks: IndexMap<String, ReleaseTable>) -> Self {
        Self { stacks }
    }

    /// Parse a JSON catalogue (`{"LCG": {"97a": ["x86_64-centos7"]}}`) and
    /// reject empty levels.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let catalogue: Self = serde_json::from_str(raw).context("parse catalogue JSON")?;
        catalogue.validate()?;
        Ok(catalogue)
    }

    pub fn insert_release<S, R, P, I>(&mut self, stack: S, release: R, platforms: I) -> &mut Self
    where
        S: Into<String>,
        R: Into<String>,
        P: Into<String>,
        I: IntoIterator<Item = P>,
    {
        self.stacks
            .entry(stack.into())
            .or_default()
            .insert(release.into(), platforms.into_iter().map(Into::into).collect());
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.stacks.is_empty() {
            bail!("catalogue has no stacks -- add at least one stack with a release and platform");
        }
        for (stack, releases) in &self.stacks {
            if releases.is_empty() {
                bail!("stack {stack:?} has no releases -- add a release or remove the stack");
            }
            for (release, platforms) in releases {
                if platforms.is_empty() {
                    bail!(
                        "release {release:?} of stack {stack:?} has no platforms -- add a platform or remove the release"
                    );
                }
            }
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.stacks.is_empty()
    }

    pub fn stack_count(&self) -> usize {
        self.stacks.len()
    }

    pub fn stack_names(&self) -> impl Iterator<Item = &str> {
        self.stacks.keys().map(String::as_str)
    }

    pub fn contains_stack(&self, stack: &str) -> bool {
        self.stacks.contains_key(stack)
    }

    pub fn releases(&self, stack: &str) -> Result<&ReleaseTable> {
        self.stacks.get(stack).ok_or_else(|| {
            anyhow!(
                "unknown stack {stack:?}; catalogue stacks are: {}",
                self.stack_names().collect::<Vec<_>>().join(", ")
            )
        })
    }

    pub fn platforms(&self, stack: &str, release: &str) -> Result<&[String]> {
        let releases = self.releases(stack)?;
        releases
            .get(release)
            .map(Vec::as_slice)
            .ok_or_else(|| anyhow!("unknown release {release:?} for stack {stack:?}"))
    }

    /// Small built-in catalogue used by `--demo` and when nothing is configured.
    pub fn demo() -> Self {
        let mut catalogue = Self::default();
        catalogue
            .insert_release(
                "LCG",
                "97a",
                ["x86_64-centos7-gcc8-opt", "x86_64-centos7-gcc9-opt"],
            )
            .insert_release(
                "LCG",
                "97",
                ["x86_64-centos7-gcc8-opt", "x86_64-slc6-gcc8-opt"],
            )
            .insert_release("LCG", "96b", ["x86_64-centos7-gcc8-opt"])
            .insert_release("CMSSW", "CMSSW_11_1_0", ["slc7_amd64_gcc820"])
            .insert_release(
                "CMSSW",
                "CMSSW_10_6_0",
                ["slc7_amd64_gcc700", "slc6_amd64_gcc700"],
            );
        catalogue
    }
}
