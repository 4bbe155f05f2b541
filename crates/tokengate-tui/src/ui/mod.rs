//! Terminal UI module using ratatui.
//!
//! - `render`: header, screens and overlays
//! - `input`: keyboard event handling
//! - `styles`: color scheme and text styling

pub mod input;
pub mod render;
pub mod styles;
