//! Outbound adapters implementing the domain's driven ports.
//!
//! - **persistence**: PostgreSQL user repository via Diesel.
//! - **memory**: in-memory user repository for fixture mode and tests.
//! - **avatar_store**: `cap-std` filesystem store for avatar images.
//!
//! Adapters translate between domain and infrastructure types and carry no
//! business rules.

pub mod avatar_store;
pub mod memory;
pub mod persistence;

pub use avatar_store::CapStdAvatarStore;
pub use memory::InMemoryUserRepository;
