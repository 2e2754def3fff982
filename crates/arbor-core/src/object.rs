//! Object identity for Arbor.
//!
//! Every model and component carries an [`ObjectBase`] that gives it a stable
//! [`ObjectId`] and a debugging name. Events refer to their source and target
//! by `ObjectId`, so identity survives event copies without keeping the
//! objects themselves alive.

use std::fmt;
use std::num::NonZeroU64;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use crate::logging::targets;

static NEXT_OBJECT_ID: AtomicU64 = AtomicU64::new(1);

/// A unique identifier for a model or component.
///
/// IDs are allocated from a process-wide counter and are never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(NonZeroU64);

impl ObjectId {
    /// Allocate a fresh identifier.
    pub fn next() -> Self {
        let raw = NEXT_OBJECT_ID.fetch_add(1, Ordering::Relaxed);
        // The counter starts at 1 and would need 2^64 allocations to wrap.
        Self(NonZeroU64::new(raw).unwrap_or(NonZeroU64::MIN))
    }

    /// Convert the ObjectId to a raw u64 value.
    #[inline]
    pub fn as_raw(self) -> u64 {
        self.0.get()
    }

    /// Create an ObjectId from a raw u64 value.
    ///
    /// Returns `None` for zero, which is never allocated.
    #[inline]
    pub fn from_raw(raw: u64) -> Option<Self> {
        NonZeroU64::new(raw).map(Self)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Base trait for anything with an Arbor identity.
pub trait Object: Send + Sync {
    /// Get this object's unique identifier.
    fn object_id(&self) -> ObjectId;
}

/// Helper for implementing the [`Object`] trait.
///
/// Include this as a field in your types to get an identifier, a mutable
/// name and the concrete type name for diagnostics.
///
/// ```
/// use arbor_core::{Object, ObjectBase, ObjectId};
///
/// struct Field {
///     base: ObjectBase,
/// }
///
/// impl Object for Field {
///     fn object_id(&self) -> ObjectId {
///         self.base.id()
///     }
/// }
///
/// let field = Field { base: ObjectBase::new::<Field>() };
/// field.base.set_name("email");
/// assert_eq!(field.base.name(), "email");
/// ```
pub struct ObjectBase {
    id: ObjectId,
    name: RwLock<String>,
    type_name: &'static str,
}

impl ObjectBase {
    /// Create a new ObjectBase for an object of type `T`.
    pub fn new<T: ?Sized + 'static>() -> Self {
        let id = ObjectId::next();
        let type_name = std::any::type_name::<T>();
        tracing::trace!(target: targets::OBJECT, %id, type_name, "created object");
        Self {
            id,
            name: RwLock::new(String::new()),
            type_name,
        }
    }

    /// Get the object's ID.
    #[inline]
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Get the object's name.
    pub fn name(&self) -> String {
        self.name.read().clone()
    }

    /// Set the object's name.
    pub fn set_name(&self, name: impl Into<String>) {
        *self.name.write() = name.into();
    }

    /// The full type name of the object, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// The type name without its module path.
    pub fn short_type_name(&self) -> &'static str {
        let without_generics = self.type_name.split('<').next().unwrap_or(self.type_name);
        without_generics.rsplit("::").next().unwrap_or(without_generics)
    }
}

impl fmt::Debug for ObjectBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectBase")
            .field("id", &self.id)
            .field("name", &self.name())
            .field("type_name", &self.short_type_name())
            .finish()
    }
}
