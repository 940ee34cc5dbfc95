// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::model::select_options;
use crate::{DEFAULT_STACK, ProjectOptions, SelectOption};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormCommand {
    SelectStack(String),
    ChangeRelease(SelectOption),
    ChangePlatform(SelectOption),
    ChangeName(String),
    ChangeUserScript(String),
    Confirm,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
    StackSelected {
        stack: String,
        release: String,
        platform: String,
    },
    ReleaseChanged {
        release: String,
        platform: String,
    },
    PlatformChanged(String),
    NameChanged,
    UserScriptChanged,
    Confirmed,
}

impl FormEvent {
    /// Text edits are already visible in their control; everything else
    /// changes a selection list or the dialog lifecycle.
    pub const fn requests_render(&self) -> bool {
        !matches!(self, Self::NameChanged | Self::UserScriptChanged)
    }
}

/// Controller behind the project dialog.
///
/// Owns the [`ProjectOptions`] record plus the two derived selection lists and
/// keeps them consistent along the `stack -> release -> platform` chain:
/// changing the stack resets release and platform to the first catalogue
/// entries, changing the release resets the platform, changing the platform
/// touches nothing else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectForm {
    options: ProjectOptions,
    release_options: Vec<SelectOption>,
    platform_options: Vec<SelectOption>,
    confirmed: bool,
}

impl ProjectForm {
    pub fn new(options: ProjectOptions) -> Result<Self> {
        Self::with_default_stack(options, DEFAULT_STACK)
    }

    /// Fill an empty stack with `default_stack`, then force release and
    /// platform into range for that stack.
    pub fn with_default_stack(mut options: ProjectOptions, default_stack: &str) -> Result<Self> {
        if options.stack.is_empty() {
            options.stack = default_stack.to_owned();
        }
        let stack = options.stack.clone();
        let mut form = Self {
            options,
            release_options: Vec::new(),
            platform_options: Vec::new(),
            confirmed: false,
        };
        form.select_stack(&stack)
            .with_context(|| format!("initialize project form with stack {stack:?}"))?;
        Ok(form)
    }

    pub fn dispatch(&mut self, command: FormCommand) -> Result<Vec<FormEvent>> {
        if self.confirmed && command != FormCommand::Confirm {
            bail!("project form already confirmed; reopen the dialog to make changes");
        }

        match command {
            FormCommand::SelectStack(stack) => self.select_stack(&stack),
            FormCommand::ChangeRelease(selection) => self.change_release(&selection),
            FormCommand::ChangePlatform(selection) => self.change_platform(&selection),
            FormCommand::ChangeName(text) => Ok(self.change_name(text)),
            FormCommand::ChangeUserScript(text) => Ok(self.change_user_script(text)),
            FormCommand::Confirm => Ok(self.confirm()),
        }
    }

    pub fn select_stack(&mut self, stack: &str) -> Result<Vec<FormEvent>> {
        let catalogue = Arc::clone(&self.options.stacks_options);
        let releases = catalogue.releases(stack).inspect_err(|error| {
            warn!(%error, "stack selection rejected");
        })?;
        let (release, platforms) = releases
            .first()
            .ok_or_else(|| anyhow!("stack {stack:?} has no releases"))?;
        let platform = platforms
            .first()
            .ok_or_else(|| anyhow!("release {release:?} of stack {stack:?} has no platforms"))?;

        self.options.stack = stack.to_owned();
        self.release_options = select_options(releases.keys());
        self.options.release = release.clone();
        self.platform_options = select_options(platforms);
        self.options.platform = platform.clone();
        debug!(stack, release = %release, platform = %platform, "stack selected");

        Ok(vec![FormEvent::StackSelected {
            stack: self.options.stack.clone(),
            release: self.options.release.clone(),
            platform: self.options.platform.clone(),
        }])
    }

    pub fn change_release(&mut self, selection: &SelectOption) -> Result<Vec<FormEvent>> {
        let catalogue = Arc::clone(&self.options.stacks_options);
        let platforms = catalogue
            .platforms(&self.options.stack, &selection.value)
            .inspect_err(|error| {
                warn!(%error, "release change rejected");
            })?;
        let platform = platforms.first().ok_or_else(|| {
            anyhow!(
                "release {:?} of stack {:?} has no platforms",
                selection.value,
                self.options.stack
            )
        })?;

        self.options.release = selection.value.clone();
        self.platform_options = select_options(platforms);
        self.options.platform = platform.clone();
        debug!(release = %self.options.release, platform = %platform, "release changed");

        Ok(vec![FormEvent::ReleaseChanged {
            release: self.options.release.clone(),
            platform: self.options.platform.clone(),
        }])
    }

    pub fn change_platform(&mut self, selection: &SelectOption) -> Result<Vec<FormEvent>> {
        let catalogue = Arc::clone(&self.options.stacks_options);
        let platforms = catalogue.platforms(&self.options.stack, &self.options.release)?;
        if !platforms.iter().any(|platform| *platform == selection.value) {
            warn!(platform = %selection.value, "platform change rejected");
            bail!(
                "unknown platform {:?} for stack {:?} release {:?}",
                selection.value,
                self.options.stack,
                self.options.release
            );
        }

        self.options.platform = selection.value.clone();
        debug!(platform = %self.options.platform, "platform changed");
        Ok(vec![FormEvent::PlatformChanged(self.options.platform.clone())])
    }

    pub fn change_name(&mut self, text: impl Into<String>) -> Vec<FormEvent> {
        self.options.name = text.into();
        vec![FormEvent::NameChanged]
    }

    pub fn change_user_script(&mut self, text: impl Into<String>) -> Vec<FormEvent> {
        self.options.user_script = text.into();
        vec![FormEvent::UserScriptChanged]
    }

    /// Mark the options final. Only the first call reports `Confirmed`.
    pub fn confirm(&mut self) -> Vec<FormEvent> {
        if self.confirmed {
            return Vec::new();
        }
        self.confirmed = true;
        info!(
            name = %self.options.name,
            stack = %self.options.stack,
            release = %self.options.release,
            platform = %self.options.platform,
            "project form confirmed"
        );
        vec![FormEvent::Confirmed]
    }

    /// Live options; callers should treat them as final only once
    /// [`Self::is_confirmed`] is true.
    pub fn options(&self) -> &ProjectOptions {
        &self.options
    }

    pub fn release_options(&self) -> &[SelectOption] {
        &self.release_options
    }

    pub fn platform_options(&self) -> &[SelectOption] {
        &self.platform_options
    }

    pub fn is_confirmed(&self) -> bool {
        self.confirmed
    }
}
