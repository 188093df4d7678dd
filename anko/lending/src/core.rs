mod account;
mod asset;
mod health;
mod interest_rate;
mod pool;

pub use {account::*, asset::*, health::*, interest_rate::*, pool::*};
