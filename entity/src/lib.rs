pub mod bills;
pub mod users;
