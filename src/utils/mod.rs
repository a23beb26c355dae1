pub mod fixture_cache;
pub mod flatten;
pub mod sink;

pub use fixture_cache::FixtureCache;
pub use flatten::{decode_event, flatten, parse_start_time};
pub use sink::{ConsoleSink, EventSink, JsonLinesSink};
