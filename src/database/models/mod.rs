pub mod division;
pub mod staff;
pub mod time_request;
pub mod user;

pub use division::Division;
pub use staff::{NewAccount, NewStaff, Staff};
pub use time_request::{NewTimeChangeRequest, TimeChangeRequest};
pub use user::AppUser;
