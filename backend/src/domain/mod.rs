//! Domain primitives, ports and services.
//!
//! Purpose: define the strongly typed user profile model and the service
//! that mutates it. Nothing here knows about HTTP, SQL or the filesystem;
//! adapters plug in through [`ports`].
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure payload.
//! - User and its field types: validated profile data.
//! - AvatarPolicy: upload checks and file naming.
//! - PublicUrl: absolute URL construction for stored avatars.
//! - ProfileService: implementation of the driving ports.

pub mod avatar;
pub mod error;
pub mod ports;
pub mod profile_service;
pub mod public_url;
pub mod trace_id;
pub mod user;

pub use self::avatar::{
    AvatarFileName, AvatarMediaType, AvatarPolicy, AvatarUpload, DEFAULT_AVATAR_URL_PREFIX,
    DEFAULT_MAX_AVATAR_BYTES,
};
pub use self::error::{Error, ErrorCode};
pub use self::profile_service::{ProfileService, SEARCH_RESULT_LIMIT};
pub use self::public_url::{DEFAULT_PUBLIC_HOST, DEFAULT_PUBLIC_PORT, PublicUrl};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    AvatarPath, BIO_MAX, Bio, USERNAME_MAX, USERNAME_PREFIX_MAX, User, UserId, UserSummary,
    UserValidationError, Username, UsernamePrefix,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use profile_service::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<()> {
///     Err(Error::unauthorized("login required"))
/// }
/// # assert!(handler().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
