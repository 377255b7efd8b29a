//! Manages process configuration.
//!
//! This crate provides utilities for:
//! - Reading environment variables for configuration.
//! - Loading an optional `.env` file before anything reads the environment.
//!
//! Everything is gathered once into [`Settings`] at startup and passed by
//! reference afterwards.

pub mod env;

pub use env::{
    api_base_from_env, load_dotenv, load_dotenv_from, token_from_env, workspace_dir_from_env,
    Settings, API_BASE_ENV, DEFAULT_API_BASE, DEFAULT_WORKSPACE_DIR, TOKEN_ENV, WORKSPACE_DIR_ENV,
};
