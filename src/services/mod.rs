pub mod account_service;
pub mod image_upload;
pub mod staff_id;
pub mod time_request_service;

pub use account_service::{AccountError, AccountService, AccountSettings, AuthOutcome, Registrar};
pub use image_upload::{CloudinaryUploader, DisabledUploader, ImageService, ImageUploader};
pub use staff_id::{allocate, Clock, SystemClock};
pub use time_request_service::{ChangeTimeRequest, TimeRequestError, TimeRequestService};
