//! Centralized constants for paths, permissions, and generator defaults.

/// Default store file, relative to the working directory.
pub const DEFAULT_STORE_FILE: &str = "data.json";

/// Default config file, relative to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "passvault.toml";

/// Environment variable overriding the store path.
pub const ENV_STORE_FILE: &str = "PASSVAULT_FILE";

/// Environment variable overriding the config path.
pub const ENV_CONFIG_FILE: &str = "PASSVAULT_CONFIG";

/// Environment variable holding the tracing filter directive.
pub const ENV_LOG: &str = "PASSVAULT_LOG";

/// Suffix appended to the store file name for the writer lock.
pub const LOCK_SUFFIX: &str = ".lock";

/// Permission mode for the store file.
pub const STORE_FILE_MODE: u32 = 0o600;

/// Permission mode for the config file.
pub const CONFIG_FILE_MODE: u32 = 0o640;

/// Permission mode for directories created to hold the store.
pub const STORE_DIR_MODE: u32 = 0o700;

/// ASCII letters, lower then upper case.
pub const LETTERS: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Decimal digits.
pub const DIGITS: &str = "0123456789";

/// Default symbol set.
pub const SYMBOLS: &str = "!#$%&()*+";

/// Default letter count range.
pub const LETTERS_RANGE: (usize, usize) = (7, 10);

/// Default digit count range.
pub const DIGITS_RANGE: (usize, usize) = (2, 10);

/// Default symbol count range.
pub const SYMBOLS_RANGE: (usize, usize) = (2, 10);

/// Hard cap on generated password length.
pub const MAX_PASSWORD_LENGTH: usize = 32;
