//! Terminal UI module using ratatui.
//!
//! - `render`: Main frame rendering, layout and overlays
//! - `input`: Keyboard event handling
//! - `leagues`: League table and detail panel
//! - `styles`: Color schemes and text styling

pub mod input;
pub mod leagues;
pub mod render;
pub mod styles;
