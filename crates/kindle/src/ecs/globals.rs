//! # Globals — One Value per Type
//!
//! Game time, input state, the score: data that belongs to the game rather
//! than to any entity. Stored as `Box<dyn Any>` keyed by `TypeId`, one slot
//! per type.
//!
//! [`get`](Globals::get) never invents a value. A global that was never set
//! is an [`EcsError::GlobalMissing`]; callers that want a default ask for it
//! explicitly with [`get_or_default`](Globals::get_or_default).

use std::any::{Any, TypeId};
use std::collections::HashMap;

use crate::ecs::store::short_type_name;
use crate::error::{EcsError, Result};

#[derive(Default)]
pub struct Globals {
    values: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl Globals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the global of type `T`.
    pub fn set<T: 'static + Send + Sync>(&mut self, value: T) {
        self.values.insert(TypeId::of::<T>(), Box::new(value));
    }

    pub fn get<T: 'static + Send + Sync>(&self) -> Result<&T> {
        self.try_get().ok_or_else(missing::<T>)
    }

    pub fn get_mut<T: 'static + Send + Sync>(&mut self) -> Result<&mut T> {
        self.try_get_mut().ok_or_else(missing::<T>)
    }

    pub fn try_get<T: 'static + Send + Sync>(&self) -> Option<&T> {
        self.values
            .get(&TypeId::of::<T>())
            .and_then(|value| value.downcast_ref())
    }

    pub fn try_get_mut<T: 'static + Send + Sync>(&mut self) -> Option<&mut T> {
        self.values
            .get_mut(&TypeId::of::<T>())
            .and_then(|value| value.downcast_mut())
    }

    /// The global of type `T`, inserting `T::default()` first if unset.
    pub fn get_or_default<T: 'static + Send + Sync + Default>(&mut self) -> &mut T {
        let value = self
            .values
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(T::default()) as Box<dyn Any + Send + Sync>);
        match value.downcast_mut() {
            Some(typed) => typed,
            None => unreachable!("global keyed by the wrong TypeId"),
        }
    }

    pub fn has<T: 'static + Send + Sync>(&self) -> bool {
        self.values.contains_key(&TypeId::of::<T>())
    }

    /// Take the global out. Returns `None` if it was never set.
    pub fn remove<T: 'static + Send + Sync>(&mut self) -> Option<T> {
        self.values
            .remove(&TypeId::of::<T>())
            .and_then(|value| value.downcast::<T>().ok())
            .map(|boxed| *boxed)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }
}

fn missing<T>() -> EcsError {
    EcsError::GlobalMissing(short_type_name(std::any::type_name::<T>()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, PartialEq)]
    struct Score(u32);

    #[test]
    fn set_overwrites() {
        let mut globals = Globals::new();
        globals.set(Score(1));
        globals.set(Score(2));
        assert_eq!(globals.get::<Score>().unwrap(), &Score(2));
        assert_eq!(globals.len(), 1);
    }

    #[test]
    fn missing_global_is_an_error() {
        let globals = Globals::new();
        assert!(matches!(
            globals.get::<Score>(),
            Err(EcsError::GlobalMissing("Score"))
        ));
        assert!(globals.try_get::<Score>().is_none());
        assert!(!globals.has::<Score>());
    }

    #[test]
    fn get_or_default_inserts_once() {
        let mut globals = Globals::new();
        globals.get_or_default::<Score>().0 += 5;
        globals.get_or_default::<Score>().0 += 5;
        assert_eq!(globals.get::<Score>().unwrap(), &Score(10));
    }

    #[test]
    fn remove_and_reinsert() {
        let mut globals = Globals::new();
        globals.set(String::from("hello"));
        let taken = globals.remove::<String>();
        assert_eq!(taken.as_deref(), Some("hello"));
        assert!(!globals.has::<String>());
        assert_eq!(globals.remove::<String>(), None);

        globals.set(taken.unwrap_or_default());
        *globals.get_mut::<String>().unwrap() += "!";
        assert_eq!(globals.get::<String>().unwrap(), "hello!");
    }
}
