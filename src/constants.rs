// src/constants.rs
//
// Application-wide names and defaults shared by config, CLI and adapters.

/// Directory name under the platform config/data dirs.
pub const APP_DIR: &str = "pnote";

/// Config file name inside `<config_dir>/pnote/`.
pub const CONFIG_FILE: &str = "config.toml";

/// Session file name inside `<data_dir>/pnote/`.
pub const SESSION_FILE: &str = "session.json";

/// Environment variable overriding `backend.url`.
pub const ENV_BACKEND_URL: &str = "PNOTE_BACKEND_URL";

/// Environment variable overriding `backend.anon_key`.
pub const ENV_ANON_KEY: &str = "PNOTE_ANON_KEY";

pub const DEFAULT_NOTES_TABLE: &str = "todos";
pub const DEFAULT_PROFILES_TABLE: &str = "profiles";
pub const DEFAULT_NOTE_BUCKET: &str = "product-images";
pub const DEFAULT_AVATAR_BUCKET: &str = "avatars";

/// Request timeout when the config does not set one.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Prefix for object names of images attached to notes.
pub const NOTE_IMAGE_PREFIX: &str = "note";
