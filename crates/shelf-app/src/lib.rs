// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod error;
pub mod forms;
pub mod location;
pub mod model;
pub mod pagination;
pub mod render;
pub mod sequencer;
pub mod state;

pub use error::*;
pub use forms::*;
pub use location::*;
pub use model::*;
pub use pagination::*;
pub use render::*;
pub use sequencer::*;
pub use state::*;
