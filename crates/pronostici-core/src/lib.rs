// Core types shared by the fetcher, the board and the terminal UI:
// match/prediction model, pure formatting helpers, configuration, and the
// durable key-value store backing the user's manual picks.

pub mod choices;
pub mod config;
pub mod format;
pub mod model;
pub mod store;
