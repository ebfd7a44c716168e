use super::*;

mod dataset;
mod layout;

pub(in crate::tui) use dataset::*;
pub(in crate::tui) use layout::*;
