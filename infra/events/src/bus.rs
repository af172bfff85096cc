use crate::error::EventBusError;
use crate::receiver::EventReceiverExt;
use fxhash::FxHashMap;
use parking_lot::RwLock;
use std::any::{Any, TypeId};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

/// 128 is plenty for domain events between slices.
const DEFAULT_CAPACITY: usize = 128;

/// Marker trait for types that can be sent across the [`EventBus`].
///
/// Any type that is `Send + Sync + 'static` automatically implements this trait.
pub trait Event: Any + Send + Sync + 'static {}
impl<T: Any + Send + Sync + 'static> Event for T {}

#[derive(Debug)]
struct ChannelState {
    capacity: usize,
    sender: Box<dyn Any + Send + Sync>,
}

/// Thread-safe broadcast bus, one channel per event type.
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    channels: Arc<RwLock<FxHashMap<TypeId, ChannelState>>>,
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes to `T` with the default buffer.
    ///
    /// # Errors
    /// Returns [`EventBusError::TypeMismatch`] if the registry is corrupted.
    pub fn subscribe<T: Event>(&self) -> Result<broadcast::Receiver<Arc<T>>, EventBusError> {
        self.subscribe_with_capacity::<T>(DEFAULT_CAPACITY)
    }

    /// Subscribes to `T`; the capacity only applies when this call creates the channel.
    ///
    /// # Errors
    /// Returns [`EventBusError::InvalidCapacity`] for a zero capacity.
    pub fn subscribe_with_capacity<T: Event>(
        &self,
        capacity: usize,
    ) -> Result<broadcast::Receiver<Arc<T>>, EventBusError> {
        if capacity == 0 {
            return Err(EventBusError::InvalidCapacity {
                message: "capacity must be >= 1".into(),
                context: Some(std::any::type_name::<T>().into()),
            });
        }
        Ok(self.sender::<T>(capacity)?.subscribe())
    }

    /// Publishes `event` to every current subscriber and returns how many got it.
    ///
    /// Publishing with nobody listening is not an error.
    ///
    /// # Errors
    /// Returns [`EventBusError::TypeMismatch`] if the registry is corrupted.
    pub fn publish<T: Event>(&self, event: T) -> Result<usize, EventBusError> {
        self.publish_arc(Arc::new(event))
    }

    /// Same as [`EventBus::publish`] without re-wrapping.
    ///
    /// # Errors
    /// Returns [`EventBusError::TypeMismatch`] if the registry is corrupted.
    pub fn publish_arc<T: Event>(&self, event: Arc<T>) -> Result<usize, EventBusError> {
        let sender = self.sender::<T>(DEFAULT_CAPACITY)?;
        sender.send(event).map_or_else(
            |_| {
                trace!(event = std::any::type_name::<T>(), "Event dropped: no active subscribers");
                Ok(0)
            },
            |count| {
                trace!(event = std::any::type_name::<T>(), count, "Event dispatched");
                Ok(count)
            },
        )
    }

    /// Subscribes to `T` and runs `handler` for every event on the current runtime.
    ///
    /// The subscription is taken before this returns, so events published right
    /// after are not missed. The task ends when the bus is shut down.
    ///
    /// # Errors
    /// Returns [`EventBusError::Spawn`] outside a Tokio runtime.
    pub fn listen<T, F, Fut>(&self, mut handler: F) -> Result<JoinHandle<()>, EventBusError>
    where
        T: Event,
        F: FnMut(Arc<T>) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let runtime = tokio::runtime::Handle::try_current().map_err(|e| EventBusError::Spawn {
            message: e.to_string().into(),
            context: Some(std::any::type_name::<T>().into()),
        })?;
        let mut rx = self.subscribe::<T>()?;

        Ok(runtime.spawn(async move {
            while let Some(event) = EventReceiverExt::recv(&mut rx).await {
                handler(event).await;
            }
            debug!(event = std::any::type_name::<T>(), "Event listener stopped");
        }))
    }

    /// Drops every channel. Listeners finish once their backlog is drained.
    ///
    /// Returns the number of closed channels.
    #[must_use]
    pub fn shutdown(&self) -> usize {
        let mut channels = self.channels.write();
        let count = channels.len();
        channels.clear();
        count
    }

    fn sender<T: Event>(&self, capacity: usize) -> Result<broadcast::Sender<Arc<T>>, EventBusError> {
        let id = TypeId::of::<T>();

        if let Some(state) = self.channels.read().get(&id) {
            if state.capacity != capacity && capacity != DEFAULT_CAPACITY {
                warn!(
                    event = std::any::type_name::<T>(),
                    existing_capacity = state.capacity,
                    requested_capacity = capacity,
                    "Channel already initialized with a different capacity"
                );
            }
            return downcast::<T>(state);
        }

        let mut channels = self.channels.write();
        let state = channels.entry(id).or_insert_with(|| {
            trace!(event = std::any::type_name::<T>(), capacity, "Initializing new event channel");
            let (tx, _) = broadcast::channel::<Arc<T>>(capacity);
            ChannelState { capacity, sender: Box::new(tx) }
        });
        downcast::<T>(state)
    }
}

fn downcast<T: Event>(state: &ChannelState) -> Result<broadcast::Sender<Arc<T>>, EventBusError> {
    state.sender.downcast_ref::<broadcast::Sender<Arc<T>>>().cloned().ok_or_else(|| {
        EventBusError::TypeMismatch {
            message: std::any::type_name::<T>().into(),
            context: Some("Unexpected event type".into()),
        }
    })
}
