use anyhow::Result;
use base64::Engine;
use diesel::{prelude::*, PgConnection};

use project_tracker_db::object_id::UserId;

pub const KEY_PREFIX: &str = "ptk1";

pub struct ApiKeyData {
    /// The plaintext key, shown exactly once at creation time.
    pub key: String,
    pub hash: Vec<u8>,
}

impl ApiKeyData {
    pub fn new() -> ApiKeyData {
        let mut bytes = [0u8; 32];
        bytes[..16].copy_from_slice(uuid::Uuid::new_v4().as_bytes());
        bytes[16..].copy_from_slice(uuid::Uuid::new_v4().as_bytes());

        let key = format!(
            "{KEY_PREFIX}.{}",
            base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
        );
        let hash = hash_key(&key);

        ApiKeyData { key, hash }
    }
}

impl Default for ApiKeyData {
    fn default() -> Self {
        Self::new()
    }
}

pub fn hash_key(key: &str) -> Vec<u8> {
    blake3::hash(key.as_bytes()).as_bytes().to_vec()
}

/// Generate a key for the user and store its hash. Only the hash is
/// persisted, so a lost key can only be replaced, not recovered.
pub fn make_key(conn: &mut PgConnection, user_id: UserId) -> Result<ApiKeyData> {
    let key = ApiKeyData::new();

    let updated = diesel::update(project_tracker_db::users::table)
        .filter(project_tracker_db::users::id.eq(user_id))
        .set(project_tracker_db::users::api_key_hash.eq(Some(key.hash.clone())))
        .execute(conn)?;
    anyhow::ensure!(updated == 1, "user {user_id} not found");

    Ok(key)
}
