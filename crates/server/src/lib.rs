#[macro_use]
extern crate log;

pub mod dispatcher;
pub mod search;
pub mod settings;
pub mod worker;

pub use dispatcher::Dispatcher;
pub use settings::Settings;
