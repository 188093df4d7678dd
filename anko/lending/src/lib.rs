mod core;
mod error;
mod execute;
mod executor;
mod pending;
mod prices;
mod query;
mod response;
mod state;
mod transfer;

pub use crate::{
    core::*,
    error::*,
    executor::{batch_needs_prices, referenced_asset_ids},
    pending::*,
    prices::*,
    response::*,
    state::*,
    transfer::*,
};
