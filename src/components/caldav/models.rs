/// Result of a successful create
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CreatedEvent {
    /// UID written into the event, also the resource file stem
    pub uid: String,
    /// Full URL of the created resource
    pub href: String,
}
