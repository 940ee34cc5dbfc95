// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use swanform_app::Catalogue;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogueSource {
    File(PathBuf),
    BuiltIn,
}

impl CatalogueSource {
    /// `--catalogue` wins, `--demo` forces the built-in catalogue, then the
    /// configured path, then the built-in catalogue.
    pub fn resolve(flag: Option<&Path>, configured: Option<PathBuf>, demo: bool) -> Self {
        if let Some(path) = flag {
            return Self::File(path.to_path_buf());
        }
        if demo {
            return Self::BuiltIn;
        }
        configured.map_or(Self::BuiltIn, Self::File)
    }

    pub fn load(&self) -> Result<Catalogue> {
        match self {
            Self::BuiltIn => {
                info!("using built-in catalogue");
                Ok(Catalogue::demo())
            }
            Self::File(path) => load_file(path),
        }
    }
}

fn load_file(path: &Path) -> Result<Catalogue> {
    let raw = fs::read_to_string(path).with_context(|| {
        format!(
            "read catalogue {} -- fix --catalogue or [catalogue].path and retry",
            path.display()
        )
    })?;
    let catalogue = Catalogue::from_json_str(&raw)
        .with_context(|| format!("load catalogue {}", path.display()))?;
    info!(
        path = %path.display(),
        stacks = catalogue.stack_count(),
        "catalogue loaded"
    );
    Ok(catalogue)
}

#[cfg(test)]
mod tests {
    use super::CatalogueSource;
    use anyhow::Result;
    use std::path::{Path, PathBuf};
    use swanform_app::Catalogue;
    use swanform_testkit::{CatalogueFaker, temp_catalogue_path};

    #[test]
    fn flag_beats_demo_and_config() {
        let source = CatalogueSource::resolve(
            Some(Path::new("/cli/stacks.json")),
            Some(PathBuf::from("/config/stacks.json")),
            true,
        );
        assert_eq!(source, CatalogueSource::File(PathBuf::from("/cli/stacks.json")));
    }

    #[test]
    fn demo_beats_configured_path() {
        let source =
            CatalogueSource::resolve(None, Some(PathBuf::from("/config/stacks.json")), true);
        assert_eq!(source, CatalogueSource::BuiltIn);
    }

    #[test]
    fn configured_path_used_without_flags() {
        let source =
            CatalogueSource::resolve(None, Some(PathBuf::from("/config/stacks.json")), false);
        assert_eq!(
            source,
            CatalogueSource::File(PathBuf::from("/config/stacks.json"))
        );
        assert_eq!(
            CatalogueSource::resolve(None, None, false),
            CatalogueSource::BuiltIn
        );
    }

    #[test]
    fn file_source_loads_fixture_in_order() -> Result<()> {
        let expected = CatalogueFaker::new(7).catalogue();
        let (_dir, path) = temp_catalogue_path(&expected)?;
        let loaded = CatalogueSource::File(path).load()?;
        assert_eq!(loaded, expected);
        assert_eq!(
            loaded.stack_names().collect::<Vec<_>>(),
            expected.stack_names().collect::<Vec<_>>()
        );
        Ok(())
    }

    #[test]
    fn missing_file_names_the_flag_and_config_key() {
        let error = CatalogueSource::File(PathBuf::from("/nonexistent/stacks.json"))
            .load()
            .expect_err("missing catalogue should fail");
        let message = error.to_string();
        assert!(message.contains("/nonexistent/stacks.json"));
        assert!(message.contains("[catalogue].path"));
    }

    #[test]
    fn empty_catalogue_file_is_rejected() -> Result<()> {
        let (_dir, path) = temp_catalogue_path(&Catalogue::default())?;
        let error = CatalogueSource::File(path)
            .load()
            .expect_err("empty catalogue should fail");
        assert!(format!("{error:#}").contains("has no stacks"));
        Ok(())
    }

    #[test]
    fn built_in_source_is_the_demo_catalogue() -> Result<()> {
        assert_eq!(CatalogueSource::BuiltIn.load()?, Catalogue::demo());
        Ok(())
    }
}
