#![doc(html_root_url = "https://docs.rs/keyline/0.1.0-beta")]

//! <h1 align="center">KEYLINE - Timeline & Keyframe Animation for Live Parameters</h1>
//! <div style="text-align:center;font-style:italic;">Keyline animates named parameter records over time - written in Rust.</div>
//! <br/>
//!
//! # Documentation
//!
//! This is the API documentation.<br/>
//! To see the code in action, visit the [examples](https://github.com/dclause/keyline/tree/develop/keyline/examples) directory.
//!
//! # Features
//!
//! **Keyline** is a Rust library designed to drive the tweakable parameters of a real-time visual (or
//! any other live system) from a timeline of keyframes, and to record that timeline live while it plays.
//!
//! - Drive playback from a [`Clock`](timing::Clock): autonomous (wall-clock with rate, loop and step)
//!   or slaved to an external position such as media playback time
//! - Describe per-track [`Keyframe`](animations::Keyframe)s targeting any subset of a live
//!   [`State`](utils::State) record, eased by named curves, cubic-beziers or value curves
//! - Play a [`Player`](animations::Player) at any time (forward, backward or jumping) and fire the
//!   [`Call`](utils::Call)s of the keyframes crossed on the way
//! - Record live edits smoothly, splice a timeline, re-anchor it to another time base
//! - Export and re-import whole timelines as [`Frames`](animations::Frames) (JSON)
//!
//! # Getting Started
//!
//! - Add the following to your `Cargo.toml`:
//! ```toml
//! [dependencies]
//! keyline = "0.1.0-beta"
//! ```
//!
//! The following code demonstrates the simplest program we could imagine: ramp a speed parameter
//! from 0 to 1 over one second, then sample it halfway.
//! ```rust
//! use keyline::animations::{Keyframe, LiveState, Player};
//! use keyline::utils::State;
//!
//! // The live parameters: shared between the player and the consumer.
//! let tendrils = LiveState::new(State::from_iter([("speed", 0.0)]));
//!
//! // A timeline with a single track animating them.
//! let mut player = Player::new().with_track("tendrils", tendrils.clone());
//! player
//!     .track_mut("tendrils")
//!     .unwrap()
//!     .to(Keyframe::new(0.0).with_to(State::from_iter([("speed", 0.0)])))?
//!     .to(Keyframe::new(1000.0).with_to(State::from_iter([("speed", 1.0)])))?;
//!
//! player.play(500.0);
//! assert_eq!(tendrils.get("speed"), Some(State::from(0.5)));
//! # Ok::<(), keyline::errors::Error>(())
//! ```
//!
//! # Feature flags
//!
//! - **serde** -- (enabled by default) Enables serialize/deserialize capabilities for states, eases,
//!   clocks and frames (JSON export/import).
//! - **mocks** -- Provides mocked targets (useful for tests mostly).

pub mod animations;
pub mod errors;
pub mod host;
#[cfg(any(test, feature = "mocks"))]
pub mod mocks;
pub mod timing;
pub mod utils;
