pub mod events;
pub mod notifier;
pub mod store;

pub use notifier::Notifier;
pub use store::{InMemoryNotificationStore, NotificationStore, PgNotificationStore, StoreError};
