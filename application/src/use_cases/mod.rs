//! Use cases orchestrating the domain through the ports.

pub mod chat_controller;
