pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod poller;
pub mod utils;

pub use api::*;
pub use config::*;
pub use error::*;
pub use models::*;
pub use poller::{CycleReport, Poller};
pub use utils::*;
