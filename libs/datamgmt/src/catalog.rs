//! `TraitCatalog`: a generic sink/source container (§4.4, §4.4.1).

use crate::error::{DataMgmtError, DataMgmtResult};
use crate::handle::TraitDataHandle;

/// Bound shared by sink and source catalog payloads: every catalog element
/// knows which profile it belongs to (part of the `(resource-id,
/// profile-id, instance-id)` uniqueness triple) and can react to a
/// dispatched event.
pub trait CatalogElement: Send + Sync {
    fn profile_id(&self) -> u32;

    /// Invoked by `TraitCatalog::dispatch_event`. Default: ignore.
    fn on_event(&mut self, _event_id: u32) {}
}

/// Marker for catalog elements that publish data outward.
pub trait DataSink: CatalogElement {}

/// Marker for catalog elements that receive data inward.
pub trait DataSource: CatalogElement {}

const DEFAULT_CAPACITY: usize = 20;

struct Slot<T> {
    resource_id: u32,
    instance_id: u16,
    payload: T,
}

pub struct TraitCatalog<T: CatalogElement> {
    slots: Vec<Option<Slot<T>>>,
    generations: Vec<u8>,
}

impl<T: CatalogElement> Default for TraitCatalog<T> {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl<T: CatalogElement> TraitCatalog<T> {
    /// `capacity` is capped at 256: slot indices are packed into the 8-bit
    /// index half of a [`TraitDataHandle`] (§4.4.1).
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(capacity <= 256, "TraitCatalog capacity {capacity} exceeds the 256-slot limit a u8 index can address");
        Self {
            slots: (0..capacity).map(|_| None).collect(),
            generations: vec![0; capacity],
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    fn find_index(&self, resource_id: u32, profile_id: u32, instance_id: u16) -> Option<usize> {
        self.slots.iter().position(|slot| {
            slot.as_ref().is_some_and(|s| {
                s.resource_id == resource_id
                    && s.instance_id == instance_id
                    && s.payload.profile_id() == profile_id
            })
        })
    }

    /// Validates a handle against the slot it names, once, for every
    /// accessor to share (§4.4.1).
    fn resolve(&self, handle: TraitDataHandle) -> DataMgmtResult<usize> {
        let index = handle.index() as usize;
        if index >= self.slots.len() {
            return Err(DataMgmtError::InvalidHandle(handle));
        }
        if self.generations[index] != handle.generation() || self.slots[index].is_none() {
            return Err(DataMgmtError::InvalidHandle(handle));
        }
        Ok(index)
    }

    /// Reuses the slot (generation unchanged) if an entry already exists
    /// for `(resource_id, payload.profile_id(), instance_id)`; otherwise
    /// allocates a free slot and bumps its generation.
    pub fn add(
        &mut self,
        resource_id: u32,
        instance_id: u16,
        payload: T,
    ) -> DataMgmtResult<TraitDataHandle> {
        if let Some(index) = self.find_index(resource_id, payload.profile_id(), instance_id) {
            self.slots[index] = Some(Slot {
                resource_id,
                instance_id,
                payload,
            });
            return Ok(TraitDataHandle::new(index as u8, self.generations[index]));
        }

        let free = self.slots.iter().position(|s| s.is_none());
        let index = free.ok_or(DataMgmtError::NoMemory)?;
        self.generations[index] = self.generations[index].wrapping_add(1);
        self.slots[index] = Some(Slot {
            resource_id,
            instance_id,
            payload,
        });
        Ok(TraitDataHandle::new(index as u8, self.generations[index]))
    }

    /// Marks the slot empty; its generation persists and bumps on the
    /// next `add` reusing this slot.
    pub fn remove(&mut self, resource_id: u32, instance_id: u16) -> DataMgmtResult<()> {
        let index = self
            .slots
            .iter()
            .position(|slot| {
                slot.as_ref()
                    .is_some_and(|s| s.resource_id == resource_id && s.instance_id == instance_id)
            })
            .ok_or(DataMgmtError::NotFound {
                resource_id,
                instance_id,
            })?;
        self.slots[index] = None;
        Ok(())
    }

    pub fn locate_by_handle(&self, handle: TraitDataHandle) -> DataMgmtResult<&T> {
        let index = self.resolve(handle)?;
        Ok(&self.slots[index].as_ref().expect("resolved").payload)
    }

    pub fn locate_by_instance(
        &self,
        resource_id: u32,
        profile_id: u32,
        instance_id: u16,
    ) -> DataMgmtResult<(TraitDataHandle, &T)> {
        let index = self
            .find_index(resource_id, profile_id, instance_id)
            .ok_or(DataMgmtError::NotFound {
                resource_id,
                instance_id,
            })?;
        let handle = TraitDataHandle::new(index as u8, self.generations[index]);
        Ok((handle, &self.slots[index].as_ref().expect("found").payload))
    }

    /// `AddressToHandle`: wire-level address to runtime handle.
    pub fn address_to_handle(
        &self,
        resource_id: u32,
        profile_id: u32,
        instance_id: u16,
    ) -> DataMgmtResult<TraitDataHandle> {
        self.locate_by_instance(resource_id, profile_id, instance_id)
            .map(|(handle, _)| handle)
    }

    /// `HandleToAddress`: runtime handle back to `(resource_id,
    /// instance_id)`.
    pub fn handle_to_address(&self, handle: TraitDataHandle) -> DataMgmtResult<(u32, u16)> {
        let index = self.resolve(handle)?;
        let slot = self.slots[index].as_ref().expect("resolved");
        Ok((slot.resource_id, slot.instance_id))
    }

    /// `PrepareSubscriptionPathList`: every occupied slot's
    /// `(handle, resource_id, instance_id)`, up to `max`.
    pub fn prepare_subscription_path_list(
        &self,
        max: usize,
    ) -> DataMgmtResult<Vec<(TraitDataHandle, u32, u16)>> {
        let mut out = Vec::new();
        for (index, slot) in self.slots.iter().enumerate() {
            if let Some(slot) = slot {
                if out.len() >= max {
                    return Err(DataMgmtError::BufferTooSmall);
                }
                out.push((
                    TraitDataHandle::new(index as u8, self.generations[index]),
                    slot.resource_id,
                    slot.instance_id,
                ));
            }
        }
        Ok(out)
    }

    /// `DispatchEvent`: invokes every occupied slot's event hook.
    pub fn dispatch_event(&mut self, event_id: u32) {
        for slot in self.slots.iter_mut().flatten() {
            slot.payload.on_event(event_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counter {
        profile: u32,
        events: Vec<u32>,
    }

    impl CatalogElement for Counter {
        fn profile_id(&self) -> u32 {
            self.profile
        }

        fn on_event(&mut self, event_id: u32) {
            self.events.push(event_id);
        }
    }

    impl DataSink for Counter {}

    #[test]
    fn add_reuses_slot_for_same_triple_without_bumping_generation() {
        let mut catalog: TraitCatalog<Counter> = TraitCatalog::default();
        let h1 = catalog
            .add(1, 10, Counter { profile: 99, events: vec![] })
            .unwrap();
        let h2 = catalog
            .add(1, 10, Counter { profile: 99, events: vec![] })
            .unwrap();
        assert_eq!(h1, h2);
    }

    #[test]
    fn remove_then_add_reuses_slot_and_bumps_generation() {
        let mut catalog: TraitCatalog<Counter> = TraitCatalog::with_capacity(1);
        let h1 = catalog
            .add(1, 10, Counter { profile: 99, events: vec![] })
            .unwrap();
        catalog.remove(1, 10).unwrap();
        let h2 = catalog
            .add(2, 20, Counter { profile: 99, events: vec![] })
            .unwrap();
        assert_eq!(h1.index(), h2.index());
        assert_ne!(h1.generation(), h2.generation());
        assert!(catalog.locate_by_handle(h1).is_err());
    }

    #[test]
    fn catalog_full_returns_no_memory() {
        let mut catalog: TraitCatalog<Counter> = TraitCatalog::with_capacity(1);
        catalog
            .add(1, 10, Counter { profile: 99, events: vec![] })
            .unwrap();
        let err = catalog
            .add(2, 20, Counter { profile: 99, events: vec![] })
            .unwrap_err();
        assert_eq!(err, DataMgmtError::NoMemory);
    }

    #[test]
    fn prepare_subscription_path_list_overflow_reports_buffer_too_small() {
        let mut catalog: TraitCatalog<Counter> = TraitCatalog::with_capacity(2);
        catalog
            .add(1, 10, Counter { profile: 1, events: vec![] })
            .unwrap();
        catalog
            .add(2, 20, Counter { profile: 1, events: vec![] })
            .unwrap();
        assert!(catalog.prepare_subscription_path_list(1).is_err());
        assert_eq!(catalog.prepare_subscription_path_list(2).unwrap().len(), 2);
    }

    #[test]
    fn dispatch_event_reaches_every_occupied_slot() {
        let mut catalog: TraitCatalog<Counter> = TraitCatalog::with_capacity(2);
        catalog
            .add(1, 10, Counter { profile: 1, events: vec![] })
            .unwrap();
        catalog
            .add(2, 20, Counter { profile: 1, events: vec![] })
            .unwrap();
        catalog.dispatch_event(42);
        for slot in catalog.slots.iter().flatten() {
            assert_eq!(slot.payload.events, vec![42]);
        }
    }
}
