//! Client-side services for the campus review backend.
//!
//! [`HttpBackend`] talks to the REST endpoints. The services layered on top
//! ([`Directory`], [`ReviewService`], [`VoteTracker`], [`ModuleCatalog`]) are
//! generic over the backend and snapshot-store traits from `campus-core`, and
//! [`Session`] wires one of each together along with session [`Bookmarks`].

pub mod bookmarks;
mod cache;
pub mod directory;
pub mod error;
pub mod http;
pub mod modules;
pub mod reviews;
pub mod session;
pub mod settings;
pub mod votes;
mod wire;

pub use bookmarks::Bookmarks;
pub use directory::Directory;
pub use error::{Error, Result};
pub use http::HttpBackend;
pub use modules::{CourseModule, ModuleCatalog, ModuleSource};
pub use reviews::ReviewService;
pub use session::Session;
pub use settings::ClientConfig;
pub use votes::{Vote, VoteTracker};
