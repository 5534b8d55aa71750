//! Domain ports defining the edges of the hexagon.
//!
//! Driving ports ([`ProfileCommand`], [`UserSearchQuery`]) are consumed by
//! inbound adapters. Driven ports ([`UserRepository`], [`AvatarStore`],
//! [`ReadinessProbe`]) are implemented by outbound adapters and expose typed
//! errors so the domain maps failures predictably.

mod macros;
pub(crate) use macros::define_port_error;

mod avatar_store;
mod profile_command;
mod readiness_probe;
mod user_repository;
mod user_search_query;

#[cfg(test)]
pub use avatar_store::MockAvatarStore;
pub use avatar_store::{AvatarStore, AvatarStoreError};
#[cfg(test)]
pub use profile_command::MockProfileCommand;
pub use profile_command::ProfileCommand;
#[cfg(test)]
pub use readiness_probe::MockReadinessProbe;
pub use readiness_probe::{ReadinessError, ReadinessProbe};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{ProfileUpdate, UserPersistenceError, UserRepository};
#[cfg(test)]
pub use user_search_query::MockUserSearchQuery;
pub use user_search_query::UserSearchQuery;
