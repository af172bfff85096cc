//! Start-up state of the TrAi feature slices (identity, workouts, nutrition and
//! the rest), stored type-erased and found again by the concrete slice type.

use std::any::{Any, TypeId};
use std::fmt::Debug;

/// State one slice builds once at start-up and shares with its handlers.
///
/// Implemented by `#[trai_slice]`; hand-written impls are for tests.
pub trait FeatureSlice: Any + Debug + Send + Sync {
    /// Lowercase slice name, e.g. `workouts`. Unique within one server.
    fn name(&self) -> &'static str;

    fn as_any(&self) -> &dyn Any;
}

/// A slice returned by its crate's `init`, waiting to be registered.
#[derive(Debug)]
pub struct InitializedSlice {
    id: TypeId,
    name: &'static str,
    state: Box<dyn FeatureSlice>,
}

impl InitializedSlice {
    pub fn new<T: FeatureSlice>(state: T) -> Self {
        Self { id: TypeId::of::<T>(), name: state.name(), state: Box::new(state) }
    }

    #[must_use]
    pub const fn id(&self) -> TypeId {
        self.id
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub fn is<T: FeatureSlice>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }

    /// The concrete state, if this slice was built from a `T`.
    #[must_use]
    pub fn downcast<T: FeatureSlice>(&self) -> Option<&T> {
        self.state.as_any().downcast_ref::<T>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Goals {
        weekly: u8,
    }

    impl FeatureSlice for Goals {
        fn name(&self) -> &'static str {
            "goals"
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[derive(Debug)]
    struct Nutrition;

    impl FeatureSlice for Nutrition {
        fn name(&self) -> &'static str {
            "nutrition"
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[test]
    fn slice_keeps_name_and_type() {
        let slice = InitializedSlice::new(Goals { weekly: 4 });
        assert_eq!(slice.name(), "goals");
        assert!(slice.is::<Goals>());
        assert!(!slice.is::<Nutrition>());
        assert_eq!(slice.id(), TypeId::of::<Goals>());
        assert_eq!(slice.downcast::<Goals>().map(|g| g.weekly), Some(4));
        assert!(slice.downcast::<Nutrition>().is_none());
    }
}
