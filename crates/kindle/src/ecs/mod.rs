//! Entity-component world, global store and system scheduler.

pub mod bundle;
pub mod entity;
pub mod globals;
pub mod query;
#[doc(hidden)]
pub mod storage;
pub mod store;
pub mod system;
pub mod world;

pub use bundle::SpawnBundle;
pub use entity::Entity;
pub use globals::Globals;
pub use query::Query;
pub use store::ComponentStore;
pub use system::{AsAny, System, SystemId, priority};
#[cfg(feature = "diagnostics")]
pub use system::SystemTiming;
pub use world::World;
