//! HTTP adapters: request handlers and middleware

pub mod chat_handler;
pub mod health_handler;
pub mod rate_limit;
pub mod route_handler;

#[cfg(test)]
mod chat_handler_test;
