pub mod badge;
pub mod error;
pub mod interaction;

pub use string_cache::DefaultAtom as Atom;

pub use badge::{Badge, BadgeIntent, parse_catalog, resolve_catalog_path, sort_for_display};
pub use error::CatalogError;
pub use interaction::{BadgeMetadata, Coordinates, InteractionEvent, InteractionType};
