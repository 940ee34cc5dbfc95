// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod catalogue;
pub mod forms;
pub mod model;
pub mod view;

pub use catalogue::*;
pub use forms::*;
pub use model::*;
pub use view::{FormView, SelectView, StackCard, render};
