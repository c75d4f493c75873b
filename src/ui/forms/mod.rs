//! Form rendering module
//!
//! - `field_renderer`: one field with its error line
//! - `submit_button`: the submit row

mod field_renderer;
mod submit_button;

pub use field_renderer::{draw_field, FIELD_HEIGHT};
pub use submit_button::{draw_submit_button, BUTTON_HEIGHT};
