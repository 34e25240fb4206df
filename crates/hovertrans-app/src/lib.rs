pub mod background;
pub mod controller;
pub mod events;
pub mod io;
pub mod orchestrator;
pub mod session;
pub mod state;
pub mod timer;
pub mod tooltip;

#[cfg(test)]
mod tests;
