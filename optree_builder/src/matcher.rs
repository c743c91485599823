mod classify;
mod model;
mod resolve;

pub(crate) use classify::classify;
pub(crate) use model::*;
pub(crate) use resolve::*;
