//! # Event Bus
//!
//! Typed fan-out messaging between feature slices. Channels are keyed by the
//! event's Rust type, so publishers and listeners only share the event struct.
//!
//! ```rust
//! use trai_event_bus::{EventBus, EventBusError, EventReceiverExt};
//!
//! #[derive(Clone, Debug, PartialEq)]
//! struct WorkoutCompleted { id: u64 }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), EventBusError> {
//!     let bus = EventBus::new();
//!     let mut rx = bus.subscribe::<WorkoutCompleted>()?;
//!     bus.publish(WorkoutCompleted { id: 42 })?;
//!
//!     assert_eq!(EventReceiverExt::recv(&mut rx).await.map(|e| e.id), Some(42));
//!     Ok(())
//! }
//! ```

mod bus;
mod error;
mod receiver;

pub use bus::{Event, EventBus};
pub use error::{EventBusError, EventBusErrorExt};
pub use receiver::EventReceiverExt;
