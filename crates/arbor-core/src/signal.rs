//! Signal/slot system for Arbor.
//!
//! This module provides a type-safe observer mechanism for communication
//! between models, components and their containers. Signals are emitted when
//! state changes, and connected slots (callbacks) are invoked synchronously
//! on the emitting thread.
//!
//! # Key Types
//!
//! - [`Signal<Args>`] - The main signal type for emitting notifications
//! - [`VetoSignal<Args, E>`] - A signal whose slots may reject a pending change
//! - [`ConnectionId`] - Unique identifier returned when connecting a slot
//! - [`Subscription`] - Handle that disconnects its slot when dropped
//!
//! # Re-entrancy
//!
//! Emission works on a snapshot of the connection list. Slots may connect,
//! disconnect or emit (on this or any other signal) while an emission is in
//! progress; no lock is held while a slot runs. A slot disconnected during an
//! emission still receives that emission if it was part of the snapshot.
//!
//! # Example
//!
//! ```
//! use arbor_core::Signal;
//!
//! let text_changed = Signal::<String>::new();
//!
//! let conn_id = text_changed.connect(|text| {
//!     println!("Text changed to: {}", text);
//! });
//!
//! text_changed.emit("Hello, World!".to_string());
//! text_changed.disconnect(conn_id);
//! ```

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use slotmap::{new_key_type, SlotMap};

use crate::logging::{span_names, targets};

new_key_type! {
    /// A unique identifier for a signal-slot connection.
    ///
    /// Use this ID to disconnect a specific connection via [`Signal::disconnect`].
    /// The ID remains valid until the connection is explicitly disconnected or
    /// the signal is dropped.
    pub struct ConnectionId;
}

type Slot<Args> = Arc<dyn Fn(&Args) + Send + Sync>;

/// Connected slots tagged with a connection sequence number.
///
/// `SlotMap` reuses freed slots, so iteration order alone does not reflect
/// the order of connection.
struct Connections<T> {
    slots: SlotMap<ConnectionId, (u64, T)>,
    next_seq: u64,
}

impl<T: Clone> Connections<T> {
    fn new() -> Self {
        Self {
            slots: SlotMap::with_key(),
            next_seq: 0,
        }
    }

    fn insert(&mut self, slot: T) -> ConnectionId {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.slots.insert((seq, slot))
    }

    fn remove(&mut self, id: ConnectionId) -> bool {
        self.slots.remove(id).is_some()
    }

    fn clear(&mut self) {
        self.slots.clear();
    }

    fn len(&self) -> usize {
        self.slots.len()
    }

    /// The slots in connection order.
    fn snapshot(&self) -> Vec<T> {
        let mut slots: Vec<&(u64, T)> = self.slots.values().collect();
        slots.sort_unstable_by_key(|(seq, _)| *seq);
        slots.into_iter().map(|(_, slot)| slot.clone()).collect()
    }
}

struct SignalInner<Args> {
    /// All active connections.
    connections: Mutex<Connections<Slot<Args>>>,
    /// Whether signal emission is temporarily blocked.
    blocked: AtomicBool,
}

/// A type-safe signal that can have multiple connected slots.
///
/// When a signal is emitted, all connected slots are invoked in connection
/// order with a reference to the provided arguments.
///
/// # Type Parameter
///
/// - `Args`: The argument type passed to connected slots. Use `()` for signals
///   with no arguments, or a tuple for multiple arguments.
///
/// # Thread Safety
///
/// `Signal<Args>` is `Send + Sync`. Slots run on whichever thread emits.
pub struct Signal<Args> {
    inner: Arc<SignalInner<Args>>,
}

impl<Args: 'static> Default for Signal<Args> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Args: 'static> Signal<Args> {
    /// Create a new signal with no connections.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(SignalInner {
                connections: Mutex::new(Connections::new()),
                blocked: AtomicBool::new(false),
            }),
        }
    }

    /// Connect a slot (closure) to this signal.
    ///
    /// Returns a `ConnectionId` that can be used to disconnect the slot later.
    ///
    /// # Example
    ///
    /// ```
    /// use arbor_core::Signal;
    ///
    /// let signal = Signal::<String>::new();
    /// let id = signal.connect(|s| println!("Got: {}", s));
    /// signal.emit("Hello".to_string());
    /// ```
    pub fn connect<F>(&self, slot: F) -> ConnectionId
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        self.inner.connections.lock().insert(Arc::new(slot))
    }

    /// Connect a slot that is disconnected when the returned [`Subscription`]
    /// is dropped or disposed.
    ///
    /// The subscription only holds a weak reference to the signal, so it may
    /// safely outlive it.
    ///
    /// ```
    /// use arbor_core::Signal;
    /// use std::sync::atomic::{AtomicI32, Ordering};
    /// use std::sync::Arc;
    ///
    /// let signal = Signal::<i32>::new();
    /// let counter = Arc::new(AtomicI32::new(0));
    /// {
    ///     let counter_clone = counter.clone();
    ///     let _subscription = signal.subscribe(move |&n| {
    ///         counter_clone.fetch_add(n, Ordering::SeqCst);
    ///     });
    ///     signal.emit(42);
    /// }
    /// signal.emit(43);
    /// assert_eq!(counter.load(Ordering::SeqCst), 42);
    /// ```
    pub fn subscribe<F>(&self, slot: F) -> Subscription
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        let id = self.connect(slot);
        let weak: Weak<SignalInner<Args>> = Arc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.connections.lock().remove(id);
            }
        })
    }

    /// Disconnect a specific slot by its connection ID.
    ///
    /// Returns `true` if the connection was found and removed, `false` otherwise.
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        self.inner.connections.lock().remove(id)
    }

    /// Disconnect all slots from this signal.
    pub fn disconnect_all(&self) {
        self.inner.connections.lock().clear();
    }

    /// Get the number of connected slots.
    pub fn connection_count(&self) -> usize {
        self.inner.connections.lock().len()
    }

    /// Block signal emission temporarily.
    ///
    /// While blocked, calls to `emit()` will do nothing.
    pub fn set_blocked(&self, blocked: bool) {
        self.inner.blocked.store(blocked, Ordering::SeqCst);
    }

    /// Check if signal emission is currently blocked.
    pub fn is_blocked(&self) -> bool {
        self.inner.blocked.load(Ordering::SeqCst)
    }

    /// Emit the signal, invoking all connected slots in connection order.
    ///
    /// If the signal is blocked, this does nothing.
    pub fn emit(&self, args: Args) {
        let _span = tracing::trace_span!(target: targets::SIGNAL, span_names::SIGNAL).entered();
        if self.is_blocked() {
            tracing::trace!(target: targets::SIGNAL, "signal blocked, skipping emit");
            return;
        }

        let slots = self.inner.connections.lock().snapshot();
        tracing::trace!(target: targets::SIGNAL, connection_count = slots.len(), "emitting signal");

        for slot in slots {
            slot(&args);
        }
    }
}

impl<Args: 'static> fmt::Debug for Signal<Args> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("connections", &self.connection_count())
            .field("blocked", &self.is_blocked())
            .finish()
    }
}

type Gate<Args, E> = Arc<dyn Fn(&Args) -> Result<(), E> + Send + Sync>;

/// A signal whose slots may veto the change being announced.
///
/// Slots are consulted in connection order by [`check`](Self::check); the
/// first `Err` stops the walk and is returned to the caller, which is then
/// expected to abandon the change.
pub struct VetoSignal<Args, E> {
    gates: Arc<Mutex<Connections<Gate<Args, E>>>>,
}

impl<Args: 'static, E: 'static> Default for VetoSignal<Args, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Args: 'static, E: 'static> VetoSignal<Args, E> {
    /// Create a veto signal with no connections.
    pub fn new() -> Self {
        Self {
            gates: Arc::new(Mutex::new(Connections::new())),
        }
    }

    /// Connect a veto slot.
    pub fn connect<F>(&self, gate: F) -> ConnectionId
    where
        F: Fn(&Args) -> Result<(), E> + Send + Sync + 'static,
    {
        self.gates.lock().insert(Arc::new(gate))
    }

    /// Connect a veto slot tied to the returned [`Subscription`].
    pub fn subscribe<F>(&self, gate: F) -> Subscription
    where
        F: Fn(&Args) -> Result<(), E> + Send + Sync + 'static,
    {
        let id = self.connect(gate);
        let weak = Arc::downgrade(&self.gates);
        Subscription::new(move || {
            if let Some(gates) = weak.upgrade() {
                gates.lock().remove(id);
            }
        })
    }

    /// Disconnect a veto slot by its connection ID.
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        self.gates.lock().remove(id)
    }

    /// Get the number of connected veto slots.
    pub fn connection_count(&self) -> usize {
        self.gates.lock().len()
    }

    /// Ask every connected slot whether the change may proceed.
    pub fn check(&self, args: &Args) -> Result<(), E> {
        let gates = self.gates.lock().snapshot();
        for gate in gates {
            gate(args)?;
        }
        Ok(())
    }
}

impl<Args: 'static, E: 'static> fmt::Debug for VetoSignal<Args, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VetoSignal")
            .field("connections", &self.connection_count())
            .finish()
    }
}

/// A handle to a connected slot that disconnects it when dropped.
///
/// Subscriptions are type-erased so that handles for signals with different
/// argument types can be stored side by side, for example all the listeners
/// a container installed on one of its children.
#[must_use = "dropping a Subscription disconnects its slot immediately"]
pub struct Subscription {
    disconnect: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    fn new<F>(disconnect: F) -> Self
    where
        F: FnOnce() + Send + Sync + 'static,
    {
        Self {
            disconnect: Some(Box::new(disconnect)),
        }
    }

    /// Disconnect the slot now.
    pub fn dispose(mut self) {
        self.disconnect_now();
    }

    /// Keep the slot connected for the lifetime of the signal and give up
    /// the ability to disconnect it.
    pub fn forget(mut self) {
        self.disconnect = None;
    }

    /// Whether this handle still owns a connection.
    pub fn is_active(&self) -> bool {
        self.disconnect.is_some()
    }

    fn disconnect_now(&mut self) {
        if let Some(disconnect) = self.disconnect.take() {
            disconnect();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.disconnect_now();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}

static_assertions::assert_impl_all!(Signal<String>: Send, Sync);
static_assertions::assert_impl_all!(Subscription: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_signal_connect_emit() {
        let signal = Signal::<i32>::new();
        let received = Arc::new(Mutex::new(Vec::new()));

        let received_clone = received.clone();
        signal.connect(move |&value| {
            received_clone.lock().push(value);
        });

        signal.emit(42);
        signal.emit(100);

        assert_eq!(*received.lock(), vec![42, 100]);
    }

    #[test]
    fn test_signal_disconnect() {
        let signal = Signal::<i32>::new();
        let received = Arc::new(Mutex::new(Vec::new()));

        let received_clone = received.clone();
        let conn_id = signal.connect(move |&value| {
            received_clone.lock().push(value);
        });

        signal.emit(1);
        assert!(signal.disconnect(conn_id));
        assert!(!signal.disconnect(conn_id));
        signal.emit(2);

        assert_eq!(*received.lock(), vec![1]);
    }

    #[test]
    fn test_signal_blocked() {
        let signal = Signal::<i32>::new();
        let received = Arc::new(Mutex::new(Vec::new()));

        let received_clone = received.clone();
        signal.connect(move |&value| {
            received_clone.lock().push(value);
        });

        signal.emit(1);
        signal.set_blocked(true);
        signal.emit(2);
        signal.set_blocked(false);
        signal.emit(3);

        assert_eq!(*received.lock(), vec![1, 3]);
    }

    #[test]
    fn test_slots_run_in_connection_order() {
        let signal = Signal::<()>::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        for i in 0..4 {
            let order = order.clone();
            signal.connect(move |_| order.lock().push(i));
        }

        signal.emit(());
        assert_eq!(*order.lock(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_reconnected_slot_runs_last() {
        let signal = Signal::<()>::new();
        let order = Arc::new(Mutex::new(Vec::new()));
        let connect = |name: &'static str| {
            let order = order.clone();
            signal.connect(move |_| order.lock().push(name))
        };

        let a = connect("a");
        connect("b");
        assert!(signal.disconnect(a));
        connect("c");

        signal.emit(());
        assert_eq!(*order.lock(), vec!["b", "c"]);
    }

    #[test]
    fn test_subscription_disconnects_on_drop() {
        let signal = Signal::<i32>::new();
        let received = Arc::new(Mutex::new(Vec::new()));

        {
            let received_clone = received.clone();
            let _subscription = signal.subscribe(move |&value| {
                received_clone.lock().push(value);
            });
            signal.emit(1);
            assert_eq!(signal.connection_count(), 1);
        }

        signal.emit(2);
        assert_eq!(signal.connection_count(), 0);
        assert_eq!(*received.lock(), vec![1]);
    }

    #[test]
    fn test_subscription_forget_keeps_slot() {
        let signal = Signal::<()>::new();
        signal.subscribe(|_| {}).forget();
        assert_eq!(signal.connection_count(), 1);
    }

    #[test]
    fn test_subscription_outlives_signal() {
        let signal = Signal::<()>::new();
        let subscription = signal.subscribe(|_| {});
        drop(signal);
        subscription.dispose();
    }

    #[test]
    fn test_reentrant_connect_during_emit() {
        let signal = Arc::new(Signal::<()>::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let signal_clone = signal.clone();
        let calls_clone = calls.clone();
        signal.connect(move |_| {
            let calls = calls_clone.clone();
            signal_clone.connect(move |_| {
                calls.fetch_add(1, Ordering::SeqCst);
            });
        });

        // The slot added during emission is not part of the snapshot.
        signal.emit(());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(signal.connection_count(), 2);

        signal.emit(());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_reentrant_emit() {
        let signal = Arc::new(Signal::<u32>::new());
        let received = Arc::new(Mutex::new(Vec::new()));

        let signal_clone = signal.clone();
        let received_clone = received.clone();
        signal.connect(move |&depth| {
            received_clone.lock().push(depth);
            if depth < 3 {
                signal_clone.emit(depth + 1);
            }
        });

        signal.emit(0);
        assert_eq!(*received.lock(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_veto_signal_stops_at_first_rejection() {
        let veto = VetoSignal::<i32, String>::new();
        let consulted = Arc::new(AtomicUsize::new(0));

        let consulted_clone = consulted.clone();
        veto.connect(move |&value| {
            consulted_clone.fetch_add(1, Ordering::SeqCst);
            if value < 0 {
                Err("negative".to_string())
            } else {
                Ok(())
            }
        });
        let consulted_clone = consulted.clone();
        veto.connect(move |_| {
            consulted_clone.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        assert!(veto.check(&5).is_ok());
        assert_eq!(consulted.load(Ordering::SeqCst), 2);

        assert_eq!(veto.check(&-1), Err("negative".to_string()));
        assert_eq!(consulted.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_emit_from_multiple_threads() {
        let signal = Arc::new(Signal::<i32>::new());
        let received = Arc::new(Mutex::new(Vec::new()));

        let received_clone = received.clone();
        signal.connect(move |&value| {
            received_clone.lock().push(value);
        });

        let mut handles = vec![];
        for i in 0..10 {
            let signal_clone = signal.clone();
            handles.push(std::thread::spawn(move || {
                signal_clone.emit(i);
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        let values = received.lock();
        assert_eq!(values.len(), 10);
        for i in 0..10 {
            assert!(values.contains(&i), "Missing value {}", i);
        }
    }
}
