pub mod model;

pub use model::{AuctionNotification, NotificationKind, Priority};
