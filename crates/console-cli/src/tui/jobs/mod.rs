use super::*;

mod loads;
mod mutations;
mod poll;
mod spawn;

pub(in crate::tui) use poll::Poller;
