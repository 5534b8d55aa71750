//! Extractor configuration that turns framework rejections into domain errors.
//!
//! Without these handlers actix answers malformed bodies with plain-text
//! errors; registering them keeps every failure in the `{code, message}`
//! envelope with the request's trace id.

use actix_multipart::{Multipart, MultipartError};
use actix_web::error::{JsonPayloadError, PayloadError, QueryPayloadError};
use actix_web::web;
use futures_util::TryStreamExt;

use crate::domain::{AvatarPolicy, AvatarUpload, Error};
use crate::inbound::http::validation::{AVATAR, malformed_request_error, missing_field_error};

/// Bytes of non-avatar parts tolerated in an avatar upload.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// JSON bodies: malformed input is `invalid_request`, oversize is `payload_too_large`.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let mapped = match &err {
            JsonPayloadError::Overflow { .. } | JsonPayloadError::OverflowKnownLength { .. } => {
                Error::payload_too_large("request body is too large")
            }
            JsonPayloadError::ContentType => {
                Error::invalid_request("request body must be application/json")
            }
            other => malformed_request_error("JSON body", other),
        };
        mapped.into()
    })
}

/// Query strings that fail to deserialise are `invalid_request`.
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err: QueryPayloadError, _req| {
        malformed_request_error("query string", &err).into()
    })
}

/// Read the `avatar` part of a multipart body.
///
/// The part's declared content type is checked before any of its bytes are
/// buffered, and buffering stops as soon as the policy limit is passed.
/// Other parts are drained and count against a small framing allowance.
pub async fn read_avatar_part(
    mut multipart: Multipart,
    policy: &AvatarPolicy,
) -> Result<AvatarUpload, Error> {
    let too_large = policy.too_large_message();
    let mut skipped = 0_usize;
    while let Some(mut field) = multipart
        .try_next()
        .await
        .map_err(|err| map_multipart_error(&err, &too_large))?
    {
        if field.name() != Some(AVATAR.as_str()) {
            while let Some(chunk) = field
                .try_next()
                .await
                .map_err(|err| map_multipart_error(&err, &too_large))?
            {
                skipped = skipped.saturating_add(chunk.len());
                if skipped > MULTIPART_OVERHEAD {
                    return Err(policy.too_large_error());
                }
            }
            continue;
        }

        let content_type = field
            .content_type()
            .map(|mime| mime.essence_str().to_owned());
        policy.check_media_type(content_type.as_deref())?;
        let file_name = field
            .content_disposition()
            .and_then(|disposition| disposition.get_filename())
            .map(str::to_owned);

        let mut data = Vec::new();
        while let Some(chunk) = field
            .try_next()
            .await
            .map_err(|err| map_multipart_error(&err, &too_large))?
        {
            if data.len().saturating_add(chunk.len()) > policy.max_bytes() {
                return Err(policy.too_large_error());
            }
            data.extend_from_slice(&chunk);
        }
        return Ok(AvatarUpload::new(content_type, file_name, data));
    }
    Err(missing_field_error(AVATAR))
}

fn map_multipart_error(err: &MultipartError, too_large: &str) -> Error {
    match err {
        MultipartError::Payload(PayloadError::Overflow) => Error::payload_too_large(too_large),
        MultipartError::ContentTypeMissing | MultipartError::ContentTypeIncompatible => {
            Error::invalid_request("avatar must be sent as multipart/form-data")
        }
        other => malformed_request_error("multipart body", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    fn overflow_maps_to_policy_message() {
        let err = MultipartError::Payload(PayloadError::Overflow);
        let mapped = map_multipart_error(&err, "avatar must not exceed 5 MB");
        assert_eq!(mapped.code(), ErrorCode::PayloadTooLarge);
        assert_eq!(mapped.message(), "avatar must not exceed 5 MB");
    }

    #[rstest]
    #[case(MultipartError::ContentTypeMissing)]
    #[case(MultipartError::ContentTypeIncompatible)]
    fn wrong_content_type_is_invalid_request(#[case] err: MultipartError) {
        let mapped = map_multipart_error(&err, "unused");
        assert_eq!(mapped.code(), ErrorCode::InvalidRequest);
        assert_eq!(mapped.message(), "avatar must be sent as multipart/form-data");
    }

    #[rstest]
    fn truncated_body_is_malformed() {
        let mapped = map_multipart_error(&MultipartError::Incomplete, "unused");
        assert_eq!(mapped.code(), ErrorCode::InvalidRequest);
        assert_eq!(
            mapped.details().and_then(|d| d.get("code")),
            Some(&serde_json::json!("malformed_request"))
        );
    }
}
