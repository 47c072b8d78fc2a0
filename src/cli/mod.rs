pub mod coin;
pub mod coins;
pub mod compare;
pub mod convert;
pub mod exchanges;
pub mod news;
pub mod setup;
pub mod ui;
