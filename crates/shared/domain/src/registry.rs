//! Slice registry for modular features.
//! Type-erased containers for initialized feature state, keyed by `TypeId`.

use std::any::{Any, TypeId, type_name};
use std::fmt::Debug;

/// Marker trait for feature state that can be shared across threads.
pub trait FeatureSlice: Any + Debug + Send + Sync {
    /// Helper to allow downcasting from the trait object.
    fn as_any(&self) -> &dyn Any;
}

/// A container for an initialized feature.
#[derive(Debug)]
pub struct InitializedSlice {
    pub id: TypeId,
    pub name: &'static str,
    pub state: Box<dyn FeatureSlice>,
}

impl InitializedSlice {
    /// Create a new initialized slice from a concrete state.
    pub fn new<T: FeatureSlice>(state: T) -> Self {
        Self { id: TypeId::of::<T>(), name: type_name::<T>(), state: Box::new(state) }
    }

    /// Borrows the state as `T` if the slice holds one.
    #[must_use]
    pub fn downcast_ref<T: FeatureSlice>(&self) -> Option<&T> {
        self.state.as_any().downcast_ref::<T>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Ledger(u8);

    impl FeatureSlice for Ledger {
        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[test]
    fn downcasts_to_registered_type_only() {
        let slice = InitializedSlice::new(Ledger(7));

        assert_eq!(slice.id, TypeId::of::<Ledger>());
        assert!(slice.name.ends_with("Ledger"));
        assert_eq!(slice.downcast_ref::<Ledger>().map(|l| l.0), Some(7));
    }
}
