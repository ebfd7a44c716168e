use super::*;

mod core;
mod overlays;
mod tables;
