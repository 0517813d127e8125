//! Headless match runner for bot-vs-bot play and CI verification.
//!
//! This crate plays Netline scenarios without a client. It loads a scenario
//! (RON or ASCII), seats one bot per hub-owning team and drives the session
//! through the turn controller. This enables:
//!
//! - **Scenario checks**: validate a map before anyone plays it
//! - **CI verification**: whole matches run in tests and stay reproducible
//! - **Wire inspection**: every broadcast message is visible as JSON
//!
//! # Output
//!
//! - **stdout**: broadcast messages as JSON lines, then one report line
//! - **stderr**: logs and optional ASCII frames
//!
//! # Example
//!
//! ```bash
//! # Play the built-in test ground
//! cargo run -p netline_headless -- run
//!
//! # Play a scenario file, drawing the map after every turn
//! cargo run -p netline_headless -- run --scenario scenarios/crossfire.txt --ascii
//!
//! # Check a scenario
//! cargo run -p netline_headless -- validate --scenario scenarios/test_ground.ron
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod render;
pub mod runner;
pub mod sink;

pub use error::HeadlessError;
pub use render::{render_ascii, AsciiConfig};
pub use runner::{
    load_scenario, summarize, HeadlessConfig, HeadlessRunner, MatchReport, ScenarioSummary,
};
pub use sink::{JsonLinesSink, MemorySink};
