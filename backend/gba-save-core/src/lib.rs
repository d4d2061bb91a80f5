//! GBA cartridge save memory and SharkPort save file conversion

pub mod cartridge;
pub mod savedata;
pub mod sharkport;
