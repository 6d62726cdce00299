// handlers/public/auth/mod.rs - Token acquisition and self-registration

pub mod register; // POST /auth/register - create staff record + account
pub mod signin; // POST /auth/signin - exchange staff id + password for a JWT

pub use register::register;
pub use signin::signin;
