//! Cartridge save memory region
//!
//! The region has a hardware save type that determines its size, and optionally a persistent
//! backing store that is written through to whenever the region is synced.

use gba_save_config::GbaSaveType;
use sharkport_common::frontend::{NullSaveWriter, SaveWriter};
use std::mem;

pub const SAVE_EXTENSION: &str = "sav";

#[derive(Debug, Clone)]
pub struct SaveMemory<S = NullSaveWriter> {
    save_type: GbaSaveType,
    memory: Box<[u8]>,
    backing: Option<S>,
}

fn new_memory(save_type: GbaSaveType, initial_save: Option<&[u8]>) -> Box<[u8]> {
    // Erased flash and EEPROM cells read as all 1s
    let mut memory = vec![0xFF; save_type.len()].into_boxed_slice();

    if let Some(initial_save) = initial_save {
        let len = initial_save.len().min(memory.len());
        memory[..len].copy_from_slice(&initial_save[..len]);
    }

    memory
}

impl SaveMemory {
    #[must_use]
    pub fn new(save_type: GbaSaveType) -> Self {
        Self { save_type, memory: new_memory(save_type, None), backing: None }
    }

    #[must_use]
    pub fn from_bytes(save_type: GbaSaveType, initial_save: &[u8]) -> Self {
        Self { save_type, memory: new_memory(save_type, Some(initial_save)), backing: None }
    }
}

impl<S: SaveWriter> SaveMemory<S> {
    /// Create save memory backed by the given store, loading any existing save from it. If the
    /// store has no save or cannot be read, the region starts out erased.
    #[must_use]
    pub fn load(save_type: GbaSaveType, mut backing: S) -> Self {
        let initial_save = backing.load_bytes(SAVE_EXTENSION).ok();
        if let Some(initial_save) = &initial_save {
            log::debug!("Loaded {} bytes of existing save data", initial_save.len());
        }

        let memory = new_memory(save_type, initial_save.as_deref());

        Self { save_type, memory, backing: Some(backing) }
    }

    /// Create save memory backed by the given store, which must contain an existing save.
    ///
    /// # Errors
    ///
    /// Propagates any error returned by the backing store while reading the save.
    pub fn try_load(save_type: GbaSaveType, mut backing: S) -> Result<Self, S::Err> {
        let initial_save = backing.load_bytes(SAVE_EXTENSION)?;
        log::debug!("Loaded {} bytes of existing save data", initial_save.len());

        let memory = new_memory(save_type, Some(&initial_save));

        Ok(Self { save_type, memory, backing: Some(backing) })
    }

    #[must_use]
    pub fn save_type(&self) -> GbaSaveType {
        self.save_type
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.memory.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.memory.is_empty()
    }

    #[must_use]
    pub fn memory(&self) -> &[u8] {
        &self.memory
    }

    /// Copy of the current contents resized for `save_type`, keeping existing bytes up to the new
    /// size and filling any remainder as erased.
    #[must_use]
    pub fn resized_memory(&self, save_type: GbaSaveType) -> Box<[u8]> {
        new_memory(save_type, Some(&self.memory))
    }

    #[must_use]
    pub fn has_backing(&self) -> bool {
        self.backing.is_some()
    }

    #[must_use]
    pub fn backing(&self) -> Option<&S> {
        self.backing.as_ref()
    }

    #[must_use]
    pub fn into_backing(self) -> Option<S> {
        self.backing
    }

    /// Change the save type, resizing the region to match. Existing contents are kept up to the
    /// new size.
    pub fn force_type(&mut self, save_type: GbaSaveType) {
        if save_type == self.save_type {
            return;
        }

        log::info!("Changing save type from {} to {save_type}", self.save_type);

        self.memory = self.resized_memory(save_type);
        self.save_type = save_type;
    }

    /// Replace the type and contents of the region and write them through to the backing store.
    /// If the write fails, the previous type and contents are restored.
    ///
    /// # Errors
    ///
    /// Propagates any error returned by the backing store.
    pub fn commit(&mut self, save_type: GbaSaveType, memory: Box<[u8]>) -> Result<(), S::Err> {
        debug_assert_eq!(memory.len(), save_type.len());

        let prev_type = mem::replace(&mut self.save_type, save_type);
        let prev_memory = mem::replace(&mut self.memory, memory);

        if let Err(err) = self.sync() {
            log::debug!("Write-through failed; restoring previous {prev_type} save memory");
            self.save_type = prev_type;
            self.memory = prev_memory;
            return Err(err);
        }

        Ok(())
    }

    /// Write the full region through to the backing store, if there is one.
    ///
    /// # Errors
    ///
    /// Propagates any error returned by the backing store.
    pub fn sync(&mut self) -> Result<(), S::Err> {
        let Some(backing) = &mut self.backing else { return Ok(()) };

        log::debug!("Persisting {} bytes of {} save memory", self.memory.len(), self.save_type);
        backing.persist_bytes(SAVE_EXTENSION, &self.memory)
    }
}
