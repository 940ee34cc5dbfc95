// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::Catalogue;

/// Stack chosen when the initial options leave `stack` empty.
pub const DEFAULT_STACK: &str = "LCG";

/// One entry of a selection control.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    /// Catalogue entries are shown as-is, so value and label match.
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            label: value.clone(),
            value,
        }
    }
}

pub(crate) fn select_options<I, S>(values: I) -> Vec<SelectOption>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    values
        .into_iter()
        .map(|value| SelectOption::new(value.as_ref()))
        .collect()
}

/// The record a project dialog edits. The host builds it, the form normalizes
/// and mutates it, and the host reads it back once the form is confirmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectOptions {
    pub name: String,
    pub stack: String,
    pub release: String,
    pub platform: String,
    pub user_script: String,
    pub stacks_options: Arc<Catalogue>,
}

impl ProjectOptions {
    pub fn new(stacks_options: Arc<Catalogue>) -> Self {
        Self {
            name: String::new(),
            stack: String::new(),
            release: String::new(),
            platform: String::new(),
            user_script: String::new(),
            stacks_options,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = stack.into();
        self
    }

    pub fn with_user_script(mut self, user_script: impl Into<String>) -> Self {
        self.user_script = user_script.into();
        self
    }

    pub fn request(&self) -> ProjectRequest {
        ProjectRequest {
            name: self.name.clone(),
            stack: self.stack.clone(),
            release: self.release.clone(),
            platform: self.platform.clone(),
            user_script: self.user_script.clone(),
        }
    }
}

/// What the host hands to whoever creates the project: the options without
/// the catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRequest {
    pub name: String,
    pub stack: String,
    pub release: String,
    pub platform: String,
    pub user_script: String,
}
