// handlers/protected/mod.rs - Protected handlers (JWT authentication required)
//
// Security Level: JWT Authentication Required
// Route Prefix: /api/*
// Middleware: jwt_auth_middleware injects `AuthUser` into request extensions

pub mod auth; // Session and credential management for the caller
pub mod requests; // Time-change requests
pub mod staff; // Staff records
