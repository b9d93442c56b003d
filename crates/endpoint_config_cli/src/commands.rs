//! Command modules for the pbx-confgen CLI.
//!
//! Each submodule handles a specific command category:
//!
//! - `config_cmd`: Configuration file management
//! - `func_keys_cmd`: Function key template merging for a user
//! - `resolve_cmd`: Endpoint template resolution

pub mod config_cmd;
pub mod func_keys_cmd;
pub mod resolve_cmd;
