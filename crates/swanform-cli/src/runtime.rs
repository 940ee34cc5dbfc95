// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use swanform_app::ProjectRequest;
use swanform_tui::DialogHost;
use tracing::info;

/// Where a confirmed request goes. Opened only on confirm, so a dismissed
/// dialog never creates or truncates the output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    Stdout,
    File(PathBuf),
}

impl OutputTarget {
    pub fn from_flag(path: Option<PathBuf>) -> Self {
        path.map_or(Self::Stdout, Self::File)
    }

    fn open(&self) -> Result<Box<dyn Write>> {
        match self {
            Self::Stdout => Ok(Box::new(io::stdout().lock())),
            Self::File(path) => {
                let file = File::create(path).with_context(|| {
                    format!(
                        "create output file {} -- pick a writable --output path",
                        path.display()
                    )
                })?;
                Ok(Box::new(BufWriter::new(file)))
            }
        }
    }
}

pub struct OutputRuntime {
    target: OutputTarget,
}

impl OutputRuntime {
    pub fn new(target: OutputTarget) -> Self {
        Self { target }
    }
}

impl DialogHost for OutputRuntime {
    fn project_confirmed(&mut self, request: &ProjectRequest) -> Result<()> {
        let mut out = self.target.open()?;
        write_request(&mut out, request)?;
        info!(
            name = %request.name,
            stack = %request.stack,
            release = %request.release,
            platform = %request.platform,
            "project request written"
        );
        Ok(())
    }

    fn dialog_dismissed(&mut self) -> Result<()> {
        info!("dialog dismissed; no request written");
        Ok(())
    }
}

pub fn write_request<W: Write>(out: &mut W, request: &ProjectRequest) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, request).context("encode project request")?;
    writeln!(out).context("write project request")?;
    out.flush().context("flush project request")
}

#[cfg(test)]
mod tests {
    use super::{OutputRuntime, OutputTarget, write_request};
    use anyhow::Result;
    use std::path::PathBuf;
    use swanform_app::ProjectRequest;
    use swanform_tui::DialogHost;

    fn sample_request() -> ProjectRequest {
        ProjectRequest {
            name: "dimuon".to_owned(),
            stack: "LCG".to_owned(),
            release: "97".to_owned(),
            platform: "x86_64-slc6".to_owned(),
            user_script: "#!/bin/bash\nexport X=1".to_owned(),
        }
    }

    #[test]
    fn request_is_pretty_json_with_trailing_newline() -> Result<()> {
        let mut out = Vec::new();
        write_request(&mut out, &sample_request())?;
        let text = String::from_utf8(out)?;
        assert!(text.starts_with("{\n  \"name\": \"dimuon\""));
        assert!(text.ends_with("}\n"));

        let decoded: ProjectRequest = serde_json::from_str(&text)?;
        assert_eq!(decoded, sample_request());
        Ok(())
    }

    #[test]
    fn stdout_stream_carries_only_the_request() -> Result<()> {
        let mut out = Vec::new();
        write_request(&mut out, &sample_request())?;
        assert!(!out.contains(&0x1b), "terminal escape in request output");
        let decoded: ProjectRequest = serde_json::from_slice(&out)?;
        assert_eq!(decoded, sample_request());
        Ok(())
    }

    #[test]
    fn from_flag_defaults_to_stdout() {
        assert_eq!(OutputTarget::from_flag(None), OutputTarget::Stdout);
        assert_eq!(
            OutputTarget::from_flag(Some(PathBuf::from("/tmp/out.json"))),
            OutputTarget::File(PathBuf::from("/tmp/out.json"))
        );
    }

    #[test]
    fn confirm_writes_file_and_dismiss_leaves_none() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let confirmed_path = temp.path().join("confirmed.json");
        let mut runtime = OutputRuntime::new(OutputTarget::File(confirmed_path.clone()));
        runtime.project_confirmed(&sample_request())?;
        let written: ProjectRequest =
            serde_json::from_str(&std::fs::read_to_string(&confirmed_path)?)?;
        assert_eq!(written.release, "97");

        let dismissed_path = temp.path().join("dismissed.json");
        let mut runtime = OutputRuntime::new(OutputTarget::File(dismissed_path.clone()));
        runtime.dialog_dismissed()?;
        assert!(!dismissed_path.exists());
        Ok(())
    }

    #[test]
    fn unwritable_output_names_the_flag() {
        let mut runtime =
            OutputRuntime::new(OutputTarget::File(PathBuf::from("/nonexistent/dir/out.json")));
        let error = runtime
            .project_confirmed(&sample_request())
            .expect_err("missing directory should fail");
        assert!(error.to_string().contains("--output"));
    }
}
