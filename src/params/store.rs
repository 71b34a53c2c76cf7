//! Lock-free parameter store shared by the host, the editor and the audio thread.
//!
//! Values are `f32` bit patterns in `AtomicU32`s, so every read sees a whole
//! value. There is no cross-parameter atomicity; [`ParameterStore::snapshot`]
//! reads the six values one after another.
//!
//! Change listeners are kept behind an `RwLock` that only control threads
//! touch. Callbacks run after the lock is released, so a listener may
//! subscribe, unsubscribe or set other parameters. The audio thread calls [`snapshot`](ParameterStore::snapshot) and
//! nothing else.

use std::fmt;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use crate::params::info::{ParamId, ParameterInfo, PARAMETERS};

/// Callback invoked on the writing thread after a value changes
pub type ParameterListener = Arc<dyn Fn(ParamId, f32) + Send + Sync>;

/// Handle returned by [`ParameterStore::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Plain copy of all six values, taken once per block
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterSnapshot {
    pub input_gain_db: f32,
    pub ratio: f32,
    pub threshold_db: f32,
    pub attack_ms: f32,
    pub release_ms: f32,
    pub output_gain_db: f32,
}

impl ParameterSnapshot {
    /// Read one value by id
    pub fn get(&self, id: ParamId) -> f32 {
        match id {
            ParamId::InputGain => self.input_gain_db,
            ParamId::Ratio => self.ratio,
            ParamId::Threshold => self.threshold_db,
            ParamId::Attack => self.attack_ms,
            ParamId::Release => self.release_ms,
            ParamId::OutputGain => self.output_gain_db,
        }
    }
}

impl Default for ParameterSnapshot {
    fn default() -> Self {
        let d = |id: ParamId| id.info().default;
        Self {
            input_gain_db: d(ParamId::InputGain),
            ratio: d(ParamId::Ratio),
            threshold_db: d(ParamId::Threshold),
            attack_ms: d(ParamId::Attack),
            release_ms: d(ParamId::Release),
            output_gain_db: d(ParamId::OutputGain),
        }
    }
}

/// The single source of truth for the six control values
pub struct ParameterStore {
    values: [AtomicU32; ParamId::COUNT],
    listeners: RwLock<Vec<(SubscriptionId, ParameterListener)>>,
    next_subscription: AtomicU64,
}

impl ParameterStore {
    /// Create a store holding every parameter's default
    pub fn new() -> Self {
        Self {
            values: std::array::from_fn(|i| AtomicU32::new(PARAMETERS[i].default.to_bits())),
            listeners: RwLock::new(Vec::new()),
            next_subscription: AtomicU64::new(0),
        }
    }

    /// Metadata for every parameter, in host order
    pub fn infos(&self) -> &'static [ParameterInfo] {
        &PARAMETERS
    }

    /// Current value
    #[inline]
    pub fn get(&self, id: ParamId) -> f32 {
        f32::from_bits(self.values[id.index()].load(Ordering::Relaxed))
    }

    /// Set a value, clamped to range and snapped to the step grid
    ///
    /// NaN is ignored. Listeners run on the calling thread when the stored
    /// value actually changes. Returns the value now stored.
    pub fn set(&self, id: ParamId, value: f32) -> f32 {
        let Some(value) = id.info().constrain(value) else {
            return self.get(id);
        };
        let previous = f32::from_bits(self.values[id.index()].swap(value.to_bits(), Ordering::Relaxed));
        if previous.to_bits() != value.to_bits() {
            self.notify(id, value);
        }
        value
    }

    /// Current value mapped to 0..1
    pub fn get_normalized(&self, id: ParamId) -> f32 {
        id.info().normalize(self.get(id))
    }

    /// Set from a 0..1 value, as host automation does
    pub fn set_normalized(&self, id: ParamId, normalized: f32) -> f32 {
        if normalized.is_nan() {
            return self.get(id);
        }
        self.set(id, id.info().denormalize(normalized))
    }

    /// Put every parameter back to its default
    pub fn reset_to_defaults(&self) {
        for info in PARAMETERS.iter() {
            self.set(info.id, info.default);
        }
    }

    /// Copy all six values; safe to call from the audio thread
    pub fn snapshot(&self) -> ParameterSnapshot {
        ParameterSnapshot {
            input_gain_db: self.get(ParamId::InputGain),
            ratio: self.get(ParamId::Ratio),
            threshold_db: self.get(ParamId::Threshold),
            attack_ms: self.get(ParamId::Attack),
            release_ms: self.get(ParamId::Release),
            output_gain_db: self.get(ParamId::OutputGain),
        }
    }

    /// Register a change listener
    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(ParamId, f32) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_subscription.fetch_add(1, Ordering::Relaxed));
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, Arc::new(listener)));
        id
    }

    /// Remove a listener; returns false if it was not registered
    pub fn unsubscribe(&self, subscription: SubscriptionId) -> bool {
        let mut listeners = self.listeners.write().unwrap_or_else(PoisonError::into_inner);
        let before = listeners.len();
        listeners.retain(|(id, _)| *id != subscription);
        listeners.len() != before
    }

    /// Number of registered listeners
    pub fn listener_count(&self) -> usize {
        self.listeners.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    fn notify(&self, id: ParamId, value: f32) {
        let listeners: Vec<ParameterListener> = self
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            listener(id, value);
        }
    }
}

impl Default for ParameterStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ParameterStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParameterStore")
            .field("values", &self.snapshot())
            .field("listeners", &self.listener_count())
            .finish()
    }
}
