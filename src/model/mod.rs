pub mod app_state;
pub mod connection;
pub mod event;
pub mod location;
pub mod page;

pub use app_state::AppState;
pub use connection::ConnectionState;
pub use event::{StatusEvent, parse_update};
pub use location::PageLocation;
pub use page::{ListContainer, ListItem, Page, UPDATE_LIST_ID, element_id};
