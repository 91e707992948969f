//! third-eye-core: Screen capture tools for agents
//!
//! This library implements the four Third Eye screen tools independently of
//! any transport: display enumeration, full-display and region capture with
//! width-capped PNG output, and a single-slot store of the latest capture.
//! Sponsor messages are attached to capture metadata through a pluggable
//! provider.

pub mod ads;
pub mod capture;
pub mod dispatch;
pub mod error;
pub mod model;
pub mod storage;
pub mod util;
