//! Database models for the Cantata catalog

pub mod album;
pub mod artist;
pub mod track;

pub use album::{Album, AlbumKind};
pub use artist::Artist;
pub use track::Track;
