// handlers/mod.rs - Two-tier handler layout
//
// Public (no auth)  → /auth/*  token acquisition and registration
// Protected (JWT)   → /api/*   everything else
pub mod protected;
pub mod public;
