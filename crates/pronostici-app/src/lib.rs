// Match board logic: backend fetcher, view-state transitions, and the async
// loop that ties them to the terminal UI.

pub mod app;
pub mod board;
pub mod fetcher;
pub mod protocol;
