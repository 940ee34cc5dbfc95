// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{ProjectForm, SelectOption};

pub const NAME_PLACEHOLDER: &str = "Project Name";
pub const RELEASE_LABEL: &str = "Release";
pub const PLATFORM_LABEL: &str = "Platform";
pub const USER_SCRIPT_LABEL: &str = "User environment";
pub const USER_SCRIPT_PLACEHOLDER: &str = "#!/bin/bash\nBash user script code here";
pub const CONFIRM_LABEL: &str = "Add";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackCard {
    pub name: String,
    pub selected: bool,
}

/// A non-searchable dropdown: the full candidate list plus the current pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectView {
    pub label: &'static str,
    pub options: Vec<SelectOption>,
    pub selected: SelectOption,
    pub searchable: bool,
}

impl SelectView {
    pub fn selected_index(&self) -> Option<usize> {
        self.options
            .iter()
            .position(|option| option.value == self.selected.value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormView {
    pub name: String,
    pub name_placeholder: &'static str,
    pub stacks: Vec<StackCard>,
    pub release: SelectView,
    pub platform: SelectView,
    pub user_script: String,
    pub user_script_label: &'static str,
    pub user_script_placeholder: &'static str,
    pub confirm_label: &'static str,
    pub confirmed: bool,
}

impl FormView {
    pub fn selected_stack_index(&self) -> Option<usize> {
        self.stacks.iter().position(|card| card.selected)
    }
}

/// Describe the form as it should be drawn right now.
pub fn render(form: &ProjectForm) -> FormView {
    let options = form.options();
    FormView {
        name: options.name.clone(),
        name_placeholder: NAME_PLACEHOLDER,
        stacks: options
            .stacks_options
            .stack_names()
            .map(|name| StackCard {
                name: name.to_owned(),
                selected: name == options.stack,
            })
            .collect(),
        release: SelectView {
            label: RELEASE_LABEL,
            options: form.release_options().to_vec(),
            selected: SelectOption::new(options.release.as_str()),
            searchable: false,
        },
        platform: SelectView {
            label: PLATFORM_LABEL,
            options: form.platform_options().to_vec(),
            selected: SelectOption::new(options.platform.as_str()),
            searchable: false,
        },
        user_script: options.user_script.clone(),
        user_script_label: USER_SCRIPT_LABEL,
        user_script_placeholder: USER_SCRIPT_PLACEHOLDER,
        confirm_label: CONFIRM_LABEL,
        confirmed: form.is_confirmed(),
    }
}

#[cfg(test)]
mod tests {
    use super::{CONFIRM_LABEL, NAME_PLACEHOLDER, render};
    use crate::{Catalogue, ProjectForm, ProjectOptions, SelectOption};
    use anyhow::Result;
    use std::sync::Arc;

    #[test]
    fn render_reflects_current_selection() -> Result<()> {
        let mut form = ProjectForm::new(ProjectOptions::new(Arc::new(Catalogue::demo())))?;
        form.select_stack("CMSSW")?;
        form.change_release(&SelectOption::new("CMSSW_10_6_0"))?;
        form.change_platform(&SelectOption::new("slc6_amd64_gcc700"))?;

        let view = render(&form);
        let cards = view
            .stacks
            .iter()
            .map(|card| (card.name.as_str(), card.selected))
            .collect::<Vec<_>>();
        assert_eq!(cards, [("LCG", false), ("CMSSW", true)]);
        assert_eq!(view.selected_stack_index(), Some(1));
        assert_eq!(view.release.selected.value, "CMSSW_10_6_0");
        assert_eq!(view.release.selected_index(), Some(1));
        assert_eq!(view.platform.selected.label, "slc6_amd64_gcc700");
        assert_eq!(view.platform.selected_index(), Some(1));
        assert!(!view.release.searchable);
        assert!(!view.platform.searchable);
        Ok(())
    }

    #[test]
    fn render_carries_labels_and_text() -> Result<()> {
        let mut form = ProjectForm::new(ProjectOptions::new(Arc::new(Catalogue::demo())))?;
        form.change_name("dimuon");
        form.change_user_script("export FOO=1");
        form.confirm();

        let view = render(&form);
        assert_eq!(view.name, "dimuon");
        assert_eq!(view.name_placeholder, NAME_PLACEHOLDER);
        assert_eq!(view.user_script, "export FOO=1");
        assert_eq!(view.confirm_label, CONFIRM_LABEL);
        assert!(view.confirmed);
        Ok(())
    }
}
