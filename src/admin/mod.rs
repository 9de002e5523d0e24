/// Back-office repositories
///
/// Each manager owns a clone of the pool plus the statement timeout and is
/// the only place SQL for its table is written.

pub mod api_keys;
pub mod events;
pub mod items;
pub mod listing;
pub mod operators;
pub mod status;
pub mod users;

pub use api_keys::ApiKeyManager;
pub use events::{EventInput, EventManager};
pub use items::ItemManager;
pub use listing::{ListParams, Page, Pagination};
pub use operators::OperatorManager;
pub use status::{StatusChange, StatusSubject};
pub use users::UserManager;
