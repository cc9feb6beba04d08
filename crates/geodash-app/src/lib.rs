// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod debounce;
pub mod ids;
pub mod model;
pub mod query;
pub mod selection;
pub mod spatial;
pub mod state;
pub mod store;
pub mod window;

pub use debounce::*;
pub use ids::*;
pub use model::*;
pub use query::*;
pub use selection::*;
pub use spatial::*;
pub use state::*;
pub use store::*;
pub use window::*;
