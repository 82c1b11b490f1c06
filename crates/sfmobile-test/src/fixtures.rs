use serde_json::{json, Value};

/// Identity URL path used by the fixtures, `/id/<orgId>/<userId>`.
pub const TEST_ID_PATH: &str = "/id/00D000000000001/005000000000001";

/// A token endpoint success payload. The identity URL points at `instance_url`.
pub fn token_response_json(instance_url: &str, scope: &str) -> Value {
    json!({
        "access_token": "test_access_token",
        "refresh_token": "test_refresh_token",
        "signature": "c2lnbmF0dXJl",
        "scope": scope,
        "instance_url": instance_url,
        "id": format!("{instance_url}{TEST_ID_PATH}"),
        "token_type": "Bearer",
        "issued_at": "1700000000000",
        "sfdc_community_url": instance_url,
        "sfdc_community_id": "0DB000000000001"
    })
}

/// An identity service payload for `username`, matching the ids of [`token_response_json`].
pub fn identity_response_json(username: &str) -> Value {
    json!({
        "id": format!("https://login.salesforce.com{TEST_ID_PATH}"),
        "asserted_user": true,
        "user_id": "005000000000001",
        "organization_id": "00D000000000001",
        "username": username,
        "nick_name": "test",
        "display_name": "Test User",
        "email": username,
        "first_name": "Test",
        "last_name": "User",
        "language": "en_US",
        "locale": "en_US",
        "user_type": "STANDARD",
        "photos": {
            "picture": "https://test.salesforce.com/profilephoto/F",
            "thumbnail": "https://test.salesforce.com/profilephoto/T"
        },
        "urls": {
            "rest": "https://test.salesforce.com/services/data/v{version}/"
        },
        "mobile_policy": {"screen_lock": 5, "pin_length": 4},
        "custom_permissions": {},
        "custom_attributes": {}
    })
}
