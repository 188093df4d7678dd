mod config;
mod events;
mod interest_rate;
mod msgs;
mod views;

pub use {config::*, events::*, interest_rate::*, msgs::*, views::*};
