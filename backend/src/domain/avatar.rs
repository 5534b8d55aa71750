//! Avatar upload validation and naming.
//!
//! Uploads are checked against an [`AvatarPolicy`] before anything touches
//! disk: the declared content type must be JPEG or PNG and the payload must
//! fit the configured size limit. Stored files are named by a random UUID so
//! names never collide and never reveal user input.

use std::fmt;

use uuid::Uuid;

use super::{AvatarPath, Error};

/// Default upper bound for avatar payloads (5 MiB).
pub const DEFAULT_MAX_AVATAR_BYTES: usize = 5 * 1024 * 1024;
/// Default URL prefix under which stored avatars are served.
pub const DEFAULT_AVATAR_URL_PREFIX: &str = "static/avatars";

/// Image formats accepted for avatars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvatarMediaType {
    /// `image/jpeg`, also declared as `image/jpg`.
    Jpeg,
    /// `image/png`.
    Png,
}

impl AvatarMediaType {
    /// Classify a declared content type such as `image/png; charset=binary`.
    ///
    /// `image/jpg` is accepted as an alias of `image/jpeg`.
    pub fn from_content_type(raw: &str) -> Option<Self> {
        let essence = raw.split(';').next().unwrap_or_default().trim();
        if essence.eq_ignore_ascii_case("image/jpeg") || essence.eq_ignore_ascii_case("image/jpg")
        {
            Some(Self::Jpeg)
        } else if essence.eq_ignore_ascii_case("image/png") {
            Some(Self::Png)
        } else {
            None
        }
    }

    /// Extension used when the uploaded filename cannot be trusted.
    pub fn canonical_extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
        }
    }

    fn accepts_extension(self, extension: &str) -> bool {
        match self {
            Self::Jpeg => matches!(extension, "jpg" | "jpeg"),
            Self::Png => extension == "png",
        }
    }

    /// Pick the stored file extension for an upload.
    ///
    /// The original extension (text after the last `.`) is kept when it
    /// agrees with the validated media type; anything else falls back to the
    /// canonical extension so a PNG can never be stored as `.html`.
    ///
    /// # Examples
    /// ```
    /// use profile_service::domain::AvatarMediaType;
    ///
    /// assert_eq!(AvatarMediaType::Jpeg.extension_for(Some("me.JPEG")), "jpeg");
    /// assert_eq!(AvatarMediaType::Png.extension_for(Some("me.svg")), "png");
    /// assert_eq!(AvatarMediaType::Png.extension_for(None), "png");
    /// ```
    pub fn extension_for(self, original_name: Option<&str>) -> String {
        original_name
            .and_then(|name| name.rsplit_once('.'))
            .map(|(_, extension)| extension.to_ascii_lowercase())
            .filter(|extension| self.accepts_extension(extension))
            .unwrap_or_else(|| self.canonical_extension().to_owned())
    }
}

/// Uploaded avatar as received from the transport.
#[derive(Clone, PartialEq, Eq)]
pub struct AvatarUpload {
    content_type: Option<String>,
    file_name: Option<String>,
    data: Vec<u8>,
}

impl AvatarUpload {
    /// Wrap the declared content type, original filename and raw bytes.
    pub fn new(content_type: Option<String>, file_name: Option<String>, data: Vec<u8>) -> Self {
        Self {
            content_type,
            file_name,
            data,
        }
    }

    /// Declared content type, if the client sent one.
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Original client-side filename, if any.
    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    /// Payload size in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Consume the upload and return its bytes.
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }
}

impl fmt::Debug for AvatarUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AvatarUpload")
            .field("content_type", &self.content_type)
            .field("file_name", &self.file_name)
            .field("len", &self.data.len())
            .finish()
    }
}

/// Name of a stored avatar file, `<32 hex digits>.<extension>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AvatarFileName(String);

impl AvatarFileName {
    /// Generate a fresh random name with the given extension.
    pub fn generate(extension: &str) -> Self {
        Self(format!("{}.{extension}", Uuid::new_v4().simple()))
    }

    /// Accept a bare file name; rejects anything that could escape the
    /// avatar directory.
    pub fn parse(raw: &str) -> Option<Self> {
        let valid = !raw.is_empty()
            && !raw.starts_with('.')
            && !raw.contains(['/', '\\'])
            && raw != "..";
        valid.then(|| Self(raw.to_owned()))
    }

    /// Borrow the name.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Extension after the last `.`.
    pub fn extension(&self) -> Option<&str> {
        self.0.rsplit_once('.').map(|(_, extension)| extension)
    }
}

impl fmt::Display for AvatarFileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Rules applied to avatar uploads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvatarPolicy {
    max_bytes: usize,
    url_prefix: String,
    prune_replaced: bool,
}

impl Default for AvatarPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_AVATAR_BYTES, DEFAULT_AVATAR_URL_PREFIX)
    }
}

impl AvatarPolicy {
    /// Create a policy with the given size limit and URL prefix.
    ///
    /// Leading and trailing slashes on the prefix are ignored.
    pub fn new(max_bytes: usize, url_prefix: impl AsRef<str>) -> Self {
        Self {
            max_bytes,
            url_prefix: url_prefix.as_ref().trim_matches('/').to_owned(),
            prune_replaced: false,
        }
    }

    /// Delete the previously stored file after a successful replacement.
    #[must_use]
    pub fn with_prune_replaced(mut self, prune: bool) -> Self {
        self.prune_replaced = prune;
        self
    }

    /// Maximum accepted payload size in bytes.
    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// URL prefix without surrounding slashes, e.g. `static/avatars`.
    pub fn url_prefix(&self) -> &str {
        &self.url_prefix
    }

    /// Whether replaced files are deleted.
    pub fn prune_replaced(&self) -> bool {
        self.prune_replaced
    }

    /// Validate the declared content type and size of `upload`.
    pub fn check(&self, upload: &AvatarUpload) -> Result<AvatarMediaType, Error> {
        let media_type = self.check_media_type(upload.content_type())?;
        if upload.len() > self.max_bytes {
            return Err(self.too_large_error());
        }
        Ok(media_type)
    }

    /// Classify a declared content type, rejecting anything but JPEG and PNG.
    ///
    /// Transports call this before buffering a body so the media type check
    /// wins over the size check.
    pub fn check_media_type(&self, content_type: Option<&str>) -> Result<AvatarMediaType, Error> {
        content_type
            .and_then(AvatarMediaType::from_content_type)
            .ok_or_else(|| {
                Error::invalid_media_type("avatar must be a JPG or PNG image").with_details(
                    serde_json::json!({
                        "field": "avatar",
                        "contentType": content_type,
                        "code": "invalid_media_type",
                    }),
                )
            })
    }

    /// Error reported when an upload exceeds the limit.
    pub fn too_large_error(&self) -> Error {
        Error::payload_too_large(self.too_large_message())
    }

    /// Message reported when an upload exceeds the limit.
    pub fn too_large_message(&self) -> String {
        format!(
            "avatar must not exceed {} MB",
            self.max_bytes / 1024 / 1024
        )
    }

    /// Server-relative URL path for a stored file.
    ///
    /// # Examples
    /// ```
    /// use profile_service::domain::{AvatarFileName, AvatarPolicy};
    ///
    /// let policy = AvatarPolicy::default();
    /// let name = AvatarFileName::parse("abc.png").unwrap();
    /// assert_eq!(policy.path_for(&name).as_ref(), "/static/avatars/abc.png");
    /// ```
    pub fn path_for(&self, file_name: &AvatarFileName) -> AvatarPath {
        let raw = if self.url_prefix.is_empty() {
            format!("/{file_name}")
        } else {
            format!("/{}/{file_name}", self.url_prefix)
        };
        AvatarPath::from_generated(raw)
    }

    /// Recover the stored file name from a path produced by [`Self::path_for`].
    ///
    /// Paths outside the prefix yield `None`.
    pub fn file_name_for(&self, path: &AvatarPath) -> Option<AvatarFileName> {
        let rest = path.as_ref().strip_prefix('/')?;
        let name = if self.url_prefix.is_empty() {
            rest
        } else {
            rest.strip_prefix(self.url_prefix.as_str())?.strip_prefix('/')?
        };
        AvatarFileName::parse(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    fn upload(content_type: &str, len: usize) -> AvatarUpload {
        AvatarUpload::new(
            Some(content_type.to_owned()),
            Some("me.png".to_owned()),
            vec![0; len],
        )
    }

    #[rstest]
    #[case("image/jpeg", Some(AvatarMediaType::Jpeg))]
    #[case("image/jpg", Some(AvatarMediaType::Jpeg))]
    #[case("IMAGE/PNG", Some(AvatarMediaType::Png))]
    #[case("image/png; charset=binary", Some(AvatarMediaType::Png))]
    #[case("image/gif", None)]
    #[case("image/svg+xml", None)]
    #[case("text/html", None)]
    #[case("", None)]
    fn classifies_content_types(#[case] raw: &str, #[case] expected: Option<AvatarMediaType>) {
        assert_eq!(AvatarMediaType::from_content_type(raw), expected);
    }

    #[rstest]
    #[case(AvatarMediaType::Jpeg, Some("photo.jpg"), "jpg")]
    #[case(AvatarMediaType::Jpeg, Some("photo.final.JPEG"), "jpeg")]
    #[case(AvatarMediaType::Png, Some("photo.png"), "png")]
    #[case(AvatarMediaType::Png, Some("photo.jpg"), "png")]
    #[case(AvatarMediaType::Jpeg, Some("photo"), "jpg")]
    #[case(AvatarMediaType::Jpeg, Some("evil.html"), "jpg")]
    fn derives_extensions(
        #[case] media_type: AvatarMediaType,
        #[case] name: Option<&str>,
        #[case] expected: &str,
    ) {
        assert_eq!(media_type.extension_for(name), expected);
    }

    #[rstest]
    fn generated_names_are_hex_with_extension() {
        let name = AvatarFileName::generate("png");
        let (stem, extension) = name.as_str().split_once('.').expect("dot");
        assert_eq!(stem.len(), 32);
        assert!(stem.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(extension, "png");
        assert_ne!(name, AvatarFileName::generate("png"));
    }

    #[rstest]
    #[case("../etc/passwd")]
    #[case("a/b.png")]
    #[case(".hidden.png")]
    #[case("")]
    fn parse_rejects_escaping_names(#[case] raw: &str) {
        assert!(AvatarFileName::parse(raw).is_none());
    }

    #[rstest]
    fn check_rejects_unknown_type_before_size() {
        let policy = AvatarPolicy::new(4, "static/avatars");
        let err = policy.check(&upload("image/gif", 100)).expect_err("bad type");
        assert_eq!(err.code(), ErrorCode::InvalidMediaType);
    }

    #[rstest]
    fn check_rejects_missing_type() {
        let policy = AvatarPolicy::default();
        let upload = AvatarUpload::new(None, None, vec![1]);
        let err = policy.check(&upload).expect_err("no type");
        assert_eq!(err.code(), ErrorCode::InvalidMediaType);
    }

    #[rstest]
    #[case(Some("image/gif"))]
    #[case(Some("text/html"))]
    #[case(None)]
    fn media_type_is_judged_without_the_body(#[case] content_type: Option<&str>) {
        let policy = AvatarPolicy::new(1, "static/avatars");
        let err = policy
            .check_media_type(content_type)
            .expect_err("unsupported type");
        assert_eq!(err.code(), ErrorCode::InvalidMediaType);
        assert_eq!(
            err.details()
                .and_then(|details| details.get("code"))
                .and_then(serde_json::Value::as_str),
            Some("invalid_media_type")
        );
    }

    #[rstest]
    fn check_enforces_limit_inclusively() {
        let policy = AvatarPolicy::new(2 * 1024 * 1024, "static/avatars");
        assert!(policy.check(&upload("image/png", 2 * 1024 * 1024)).is_ok());
        let err = policy
            .check(&upload("image/png", 2 * 1024 * 1024 + 1))
            .expect_err("too large");
        assert_eq!(err.code(), ErrorCode::PayloadTooLarge);
        assert_eq!(err.message(), "avatar must not exceed 2 MB");
    }

    #[rstest]
    #[case("static/avatars")]
    #[case("/static/avatars/")]
    fn path_round_trips_through_prefix(#[case] prefix: &str) {
        let policy = AvatarPolicy::new(10, prefix);
        let name = AvatarFileName::generate("jpg");
        let path = policy.path_for(&name);
        assert_eq!(path.as_ref(), format!("/static/avatars/{name}"));
        assert_eq!(policy.file_name_for(&path), Some(name));
    }

    #[rstest]
    fn foreign_paths_have_no_file_name() {
        let policy = AvatarPolicy::default();
        let path = AvatarPath::new("/elsewhere/a.png").expect("path");
        assert!(policy.file_name_for(&path).is_none());
    }
}
