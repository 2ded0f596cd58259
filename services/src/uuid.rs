use uuid::Uuid;

/// Deterministic UUIDv5 from an arbitrary string id.
pub fn stable_uuid(id: &str) -> Uuid {
    Uuid::new_v5(&Uuid::NAMESPACE_URL, id.as_bytes())
}

/// Short deterministic token (first 12 hex digits of [`stable_uuid`]),
/// suitable for DOM element ids.
pub fn short_stable_id(id: &str) -> String {
    let mut s = stable_uuid(id).simple().to_string();
    s.truncate(12);
    s
}

/// Short deterministic fingerprint of raw bytes (first 16 hex digits of a
/// UUIDv5 over them).
pub fn content_id(bytes: &[u8]) -> String {
    let mut s = Uuid::new_v5(&Uuid::NAMESPACE_OID, bytes).simple().to_string();
    s.truncate(16);
    s
}
