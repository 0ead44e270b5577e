#![allow(missing_docs)]

//! Category sessions: draw-without-replacement and back-navigation.

mod controller;
pub mod random;

pub use controller::{SessionController, SessionError, SessionState};
pub use random::{RandomSource, ScriptedRandom, ThreadRandom};
