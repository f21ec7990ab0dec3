// Composition root.
//
// Responsibilities
// - Read config from environment.
// - Wire the HTTP backed services into the console use cases.
// - Serve the development backend built from the in-memory adapters.

pub mod config;
pub mod state;
pub mod stub;
