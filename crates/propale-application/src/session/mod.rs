//! Session-scoped infrastructure: the event channel and the session store.

pub mod bus;
pub mod registry;

pub use bus::SessionEventBus;
pub use registry::SessionRegistry;
