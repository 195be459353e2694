pub mod fixture_store;
pub mod seen_cache;

pub use fixture_store::{FixtureStore, PreAlert, TrackedFixture};
pub use seen_cache::SeenCache;
