//! Validation coverage for user field types.

use super::*;
use rstest::rstest;

#[rstest]
#[case("a")]
#[case("sixteen_chars_ok")]
#[case("ÄÖÜäöüßéèêëàâîïô")]
fn username_accepts_one_to_sixteen_characters(#[case] raw: &str) {
    let username = Username::new(raw).expect("valid username");
    assert_eq!(username.as_ref(), raw);
}

#[rstest]
fn username_rejects_empty() {
    assert_eq!(Username::new(""), Err(UserValidationError::EmptyUsername));
}

#[rstest]
fn username_rejects_seventeen_characters() {
    let err = Username::new("a".repeat(17)).expect_err("too long");
    assert_eq!(err, UserValidationError::UsernameTooLong { max: 16 });
    assert_eq!(err.code(), "username_too_long");
}

#[rstest]
fn bio_accepts_exactly_255_characters() {
    let raw = "b".repeat(255);
    let bio = Bio::new(raw.clone()).expect("valid bio");
    assert_eq!(String::from(bio), raw);
}

#[rstest]
fn bio_rejects_256_characters() {
    assert_eq!(
        Bio::new("b".repeat(256)),
        Err(UserValidationError::BioTooLong { max: 255 })
    );
}

#[rstest]
fn bio_counts_characters_not_bytes() {
    assert!(Bio::new("é".repeat(255)).is_ok());
}

#[rstest]
#[case("", UserValidationError::EmptySearchQuery)]
#[case("abcdefghijklmnopqrstu", UserValidationError::SearchQueryTooLong { max: 20 })]
fn prefix_rejects_out_of_range_lengths(#[case] raw: &str, #[case] expected: UserValidationError) {
    assert_eq!(UsernamePrefix::new(raw), Err(expected));
}

#[rstest]
#[case("ali", "alice", true)]
#[case("ALI", "alice", true)]
#[case("ali", "Alistair", true)]
#[case("ali", "malik", false)]
#[case("alice", "ali", false)]
fn prefix_matching_ignores_case(#[case] prefix: &str, #[case] name: &str, #[case] hit: bool) {
    let prefix = UsernamePrefix::new(prefix).expect("prefix");
    let name = Username::new(name).expect("username");
    assert_eq!(prefix.matches(&name), hit);
}

#[rstest]
#[case("static/avatars/a.png")]
#[case("/")]
fn avatar_path_must_be_absolute(#[case] raw: &str) {
    assert_eq!(
        AvatarPath::new(raw),
        Err(UserValidationError::InvalidAvatarPath)
    );
}

#[rstest]
fn user_serialises_with_camel_case_fields() {
    let user = User::new(UserId::random(), Username::new("ada").expect("username"))
        .with_bio(Some(Bio::new("hello").expect("bio")));
    let value = serde_json::to_value(&user).expect("serialise user");
    assert_eq!(value["username"], "ada");
    assert_eq!(value["bio"], "hello");
    assert!(value["avatar"].is_null());
}

#[rstest]
fn deserialising_rejects_invalid_username() {
    let raw = format!(
        r#"{{"id":"{}","username":"","bio":null,"avatar":null}}"#,
        UserId::random()
    );
    assert!(serde_json::from_str::<User>(&raw).is_err());
}

#[rstest]
fn summary_keeps_identity_and_avatar() {
    let avatar = AvatarPath::new("/static/avatars/x.png").expect("path");
    let user = User::new(UserId::random(), Username::new("ada").expect("username"))
        .with_avatar(Some(avatar.clone()));
    let summary = user.summary();
    assert_eq!(&summary.id, user.id());
    assert_eq!(summary.avatar, Some(avatar));
}
