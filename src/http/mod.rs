pub mod app_error;
pub mod collect;
pub mod crud;
pub mod health;
pub mod server;
pub mod state;
