#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriberStatus {
    Pending,
    Confirmed,
}

impl SubscriberStatus {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, SubscriberStatus::Confirmed)
    }
}

// Persisted as the `confirmed` boolean column
impl From<bool> for SubscriberStatus {
    fn from(confirmed: bool) -> Self {
        if confirmed {
            SubscriberStatus::Confirmed
        } else {
            SubscriberStatus::Pending
        }
    }
}
