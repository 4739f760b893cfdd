use super::*;

mod dom;
mod form_controls;
mod html;
mod visibility;

pub(crate) use form_controls::{control_kind, is_checkbox_input, is_radio_input};
pub(crate) use html::parse_html;
