use uuid::Uuid;

/// Returns a fresh random UUID for identifiers that must never repeat
/// within a session.
pub fn new_uuid() -> Uuid {
    Uuid::new_v4()
}
