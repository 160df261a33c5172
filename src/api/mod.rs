pub mod binder;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod render;
pub mod routes;
