use uuid::Uuid;

/// Generate a fresh record identifier (UUIDv7, so ids sort by creation time).
pub fn new_record_id() -> String {
    Uuid::now_v7().to_string()
}
