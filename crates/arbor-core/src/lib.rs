//! Core primitives for Arbor.
//!
//! This crate provides the building blocks the Arbor component framework is
//! assembled from:
//!
//! - **Signals**: Type-safe observer lists with disposable subscriptions
//! - **Veto signals**: Observer lists whose slots may reject a pending change
//! - **Properties**: Change-detecting value cells
//! - **Object identity**: Stable IDs and debugging names
//! - **Sync guards**: Compare-and-set flags that break update feedback loops
//!
//! # Signal Example
//!
//! ```
//! use arbor_core::Signal;
//!
//! let value_changed = Signal::<i32>::new();
//!
//! let subscription = value_changed.subscribe(|value| {
//!     println!("Value changed to: {}", value);
//! });
//!
//! value_changed.emit(42);
//!
//! // Dropping or disposing the subscription disconnects the slot.
//! subscription.dispose();
//! assert_eq!(value_changed.connection_count(), 0);
//! ```

pub mod logging;
pub mod object;
pub mod property;
pub mod signal;
pub mod sync;

pub use logging::PerfSpan;
pub use object::{Object, ObjectBase, ObjectId};
pub use property::Property;
pub use signal::{ConnectionId, Signal, Subscription, VetoSignal};
pub use sync::{SyncGuard, SyncToken};
