//! Unit tests for configuration loading and resolution.
//!
//! Tests are organised into modules by functional area:
//! - `helpers`: Shared test utilities
//! - `precedence`: Layer precedence tests
//! - `field_resolution`: Identity, token, and ignore-list resolution tests
//! - `instruction`: Review instruction and agent settings tests

mod helpers;
