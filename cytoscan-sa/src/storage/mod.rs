//! Media storage for cytoscan-sa

pub mod media_store;

pub use media_store::{MediaStore, StoredMedia};
