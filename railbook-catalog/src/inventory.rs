use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use uuid::Uuid;

use railbook_core::booking::TicketClass;
use railbook_core::EngineError;

/// Identifies one per-class seat pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InventoryKey {
    pub train_id: Uuid,
    pub travel_date: NaiveDate,
    pub ticket_class: TicketClass,
}

#[derive(Debug, Clone, Copy)]
struct ClassInventory {
    capacity: u32,
    reserved: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReservationState {
    Held,
    Committed,
    Released,
}

#[derive(Debug, Clone)]
struct ReservationRecord {
    key: InventoryKey,
    count: u32,
    state: ReservationState,
    held_at: DateTime<Utc>,
}

/// Opaque handle returned by a successful reserve; required to release
/// or commit that specific reservation.
#[derive(Debug, Clone)]
pub struct ReservationToken {
    pub id: Uuid,
    pub key: InventoryKey,
    pub count: u32,
}

#[derive(Debug, thiserror::Error)]
pub enum InventoryError {
    #[error("insufficient seats: requested {requested}, available {available}")]
    InsufficientSeats { requested: u32, available: u32 },

    #[error("unknown reservation token: {0}")]
    UnknownToken(Uuid),

    #[error("reservation already released")]
    AlreadyReleased,

    #[error("reservation already committed")]
    AlreadyCommitted,
}

impl From<InventoryError> for EngineError {
    fn from(err: InventoryError) -> Self {
        match err {
            InventoryError::InsufficientSeats { requested, available } => {
                EngineError::InsufficientSeats { requested, available }
            }
            InventoryError::AlreadyReleased => EngineError::AlreadyReleased,
            InventoryError::AlreadyCommitted => EngineError::InvalidState {
                from: "COMMITTED".to_string(),
                to: "RELEASED".to_string(),
            },
            InventoryError::UnknownToken(id) => {
                EngineError::InvalidInput(format!("unknown reservation token: {id}"))
            }
        }
    }
}

/// Owns every per-(train, date, class) seat counter.
///
/// The capacity check and the `reserved` increment happen under that
/// key's lock, so no interleaving of concurrent reserves can drive
/// `reserved` above `capacity`; distinct keys do not contend. Entries
/// are created lazily on first touch with the capacity supplied by the
/// caller and are never destroyed.
pub struct SeatInventoryManager {
    entries: RwLock<HashMap<InventoryKey, Arc<Mutex<ClassInventory>>>>,
    reservations: Mutex<HashMap<Uuid, ReservationRecord>>,
}

impl SeatInventoryManager {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            reservations: Mutex::new(HashMap::new()),
        }
    }

    fn entry(&self, key: InventoryKey, capacity: u32) -> Arc<Mutex<ClassInventory>> {
        if let Some(entry) = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            return Arc::clone(entry);
        }
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(
            entries
                .entry(key)
                .or_insert_with(|| Arc::new(Mutex::new(ClassInventory { capacity, reserved: 0 }))),
        )
    }

    /// Atomically claim `count` seats. The token must be released or
    /// committed exactly once.
    pub fn reserve(
        &self,
        key: InventoryKey,
        count: u32,
        capacity: u32,
    ) -> Result<ReservationToken, InventoryError> {
        let entry = self.entry(key, capacity);
        {
            let mut inventory = entry.lock().unwrap_or_else(PoisonError::into_inner);
            let available = inventory.capacity - inventory.reserved;
            if count > available {
                return Err(InventoryError::InsufficientSeats { requested: count, available });
            }
            inventory.reserved += count;
        }

        let token = ReservationToken { id: Uuid::new_v4(), key, count };
        self.reservations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                token.id,
                ReservationRecord { key, count, state: ReservationState::Held, held_at: Utc::now() },
            );
        Ok(token)
    }

    /// Return the token's seats to the pool. Decrements exactly once;
    /// a second release reports `AlreadyReleased` without touching the
    /// counter.
    pub fn release(&self, token: &ReservationToken) -> Result<(), InventoryError> {
        let (key, count) = {
            let mut reservations = self.reservations.lock().unwrap_or_else(PoisonError::into_inner);
            let record = reservations
                .get_mut(&token.id)
                .ok_or(InventoryError::UnknownToken(token.id))?;
            match record.state {
                ReservationState::Released => return Err(InventoryError::AlreadyReleased),
                ReservationState::Committed => return Err(InventoryError::AlreadyCommitted),
                ReservationState::Held => {}
            }
            record.state = ReservationState::Released;
            (record.key, record.count)
        };

        let entry = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .cloned();
        if let Some(entry) = entry {
            let mut inventory = entry.lock().unwrap_or_else(PoisonError::into_inner);
            inventory.reserved = inventory.reserved.saturating_sub(count);
        }
        Ok(())
    }

    /// Mark the reservation permanent. The counter is untouched:
    /// confirmed seats stay claimed against capacity. Idempotent.
    pub fn commit(&self, token: &ReservationToken) -> Result<(), InventoryError> {
        let mut reservations = self.reservations.lock().unwrap_or_else(PoisonError::into_inner);
        let record = reservations
            .get_mut(&token.id)
            .ok_or(InventoryError::UnknownToken(token.id))?;
        match record.state {
            ReservationState::Released => Err(InventoryError::AlreadyReleased),
            ReservationState::Committed => Ok(()),
            ReservationState::Held => {
                record.state = ReservationState::Committed;
                Ok(())
            }
        }
    }

    /// Unlocked snapshot for search/display. A reserve issued right
    /// after may still lose the race; callers retry a different class
    /// or train.
    pub fn available_seats(&self, key: &InventoryKey, capacity: u32) -> u32 {
        match self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
        {
            Some(entry) => {
                let inventory = entry.lock().unwrap_or_else(PoisonError::into_inner);
                inventory.capacity - inventory.reserved
            }
            None => capacity,
        }
    }

    /// Age of a still-held reservation, for diagnostics.
    pub fn held_since(&self, token: &ReservationToken) -> Option<DateTime<Utc>> {
        self.reservations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&token.id)
            .filter(|record| record.state == ReservationState::Held)
            .map(|record| record.held_at)
    }
}

impl Default for SeatInventoryManager {
    fn default() -> Self {
        Self::new()
    }
}
