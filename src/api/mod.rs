pub mod pinnacle_api;

pub use pinnacle_api::PinnacleClient;
