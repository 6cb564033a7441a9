//! Wrap-around Snake whose food appears and vanishes on its own random
//! timers and carries effects on score, length, and speed.
//!
//! The engine (`grid`, `snake`, `food`, `collision`, `pacing`, `scheduler`,
//! `game`) runs on a virtual clock and talks to the outside only through the
//! traits in [`sink`]. The terminal front-end lives in `renderer`, `ui`,
//! `input`, and `terminal_runtime`.

pub mod collision;
pub mod config;
pub mod food;
pub mod game;
pub mod grid;
pub mod input;
pub mod pacing;
pub mod renderer;
pub mod scheduler;
pub mod sink;
pub mod snake;
pub mod terminal_runtime;
pub mod ui;
