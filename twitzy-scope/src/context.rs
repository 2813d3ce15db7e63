use log::trace;
use std::{
    any::{Any, TypeId},
    collections::HashMap,
    fmt,
    marker::PhantomData,
    rc::Rc,
};
use thiserror::Error as ThisError;

#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("{component} must be used within {provider}")]
pub struct ScopeMissingError {
    pub component: &'static str,
    pub provider: &'static str,
}

/// The chain of values published by the providers above the current node.
///
/// Providing never mutates a chain in place: it returns a new chain for the
/// provider's descendants, so siblings and independent trees never observe
/// each other's values.
#[derive(Clone, Default)]
pub struct Scopes {
    values: Rc<HashMap<TypeId, Rc<dyn Any>>>,
}

impl Scopes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn with(&self, key: TypeId, value: Rc<dyn Any>) -> Scopes {
        let mut values = (*self.values).clone();
        values.insert(key, value);
        Scopes {
            values: Rc::new(values),
        }
    }

    fn lookup(&self, key: &TypeId) -> Option<Rc<dyn Any>> {
        self.values.get(key).cloned()
    }
}

impl fmt::Debug for Scopes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scopes")
            .field("len", &self.values.len())
            .finish()
    }
}

/// Typed key for one kind of scope value.
///
/// Values are keyed by `T`, so there is exactly one context per scope type;
/// the provider name only feeds error messages.
pub struct ScopedContext<T> {
    provider: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> ScopedContext<T> {
    pub const fn new(provider: &'static str) -> Self {
        Self {
            provider,
            _marker: PhantomData,
        }
    }

    pub fn provider(&self) -> &'static str {
        self.provider
    }
}

impl<T: 'static> ScopedContext<T> {
    pub fn provide(&self, scopes: &Scopes, value: T) -> Scopes {
        self.provide_rc(scopes, Rc::new(value))
    }

    pub fn provide_rc(&self, scopes: &Scopes, value: Rc<T>) -> Scopes {
        trace!("{} provides scope", self.provider);
        scopes.with(TypeId::of::<T>(), value)
    }

    pub fn get(&self, scopes: &Scopes) -> Option<Rc<T>> {
        scopes
            .lookup(&TypeId::of::<T>())
            .and_then(|value| value.downcast::<T>().ok())
    }

    pub fn require(
        &self,
        scopes: &Scopes,
        component: &'static str,
    ) -> Result<Rc<T>, ScopeMissingError> {
        self.get(scopes).ok_or(ScopeMissingError {
            component,
            provider: self.provider,
        })
    }
}

impl<T> fmt::Debug for ScopedContext<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopedContext")
            .field("provider", &self.provider)
            .finish()
    }
}
