use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::constants::{DATABASE_FORMAT_VERSION, STATE_DATABASE_KIND};

/// Configuration for the state service.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct Config {
    /// The root directory for storing cached data.
    ///
    /// The state database is stored in the `state/v{DATABASE_FORMAT_VERSION}`
    /// subdirectory.
    ///
    /// The default directory is platform dependent, based on
    /// [`dirs::cache_dir()`](https://docs.rs/dirs/5.0.1/dirs/fn.cache_dir.html):
    ///
    /// |Platform | Value                                           | Example                            |
    /// | ------- | ----------------------------------------------- | ---------------------------------- |
    /// | Linux   | `$XDG_CACHE_HOME/shade` or `$HOME/.cache/shade` | /home/alice/.cache/shade           |
    /// | macOS   | `$HOME/Library/Caches/shade`                    | /Users/Alice/Library/Caches/shade  |
    /// | Windows | `{FOLDERID_LocalAppData}\shade`                 | C:\Users\Alice\AppData\Local\shade |
    /// | Other   | `cache/shade`, relative to the working directory |                                   |
    pub cache_dir: PathBuf,

    /// Whether to keep the state in memory only.
    ///
    /// Ephemeral state is lost when the service is dropped. Set to `false`
    /// by default. If this is set to `true`, [`cache_dir`] is ignored.
    ///
    /// [`cache_dir`]: struct.Config.html#structfield.cache_dir
    pub ephemeral: bool,
}

impl Config {
    /// Returns the path of the finalized state database.
    pub fn db_path(&self) -> PathBuf {
        self.cache_dir
            .join(STATE_DATABASE_KIND)
            .join(format!("v{DATABASE_FORMAT_VERSION}"))
    }

    /// Returns the sled configuration for the finalized state database.
    pub(crate) fn sled_config(&self) -> sled::Config {
        sled::Config::default().path(self.db_path())
    }

    /// Construct a config for an ephemeral in-memory state.
    pub fn ephemeral() -> Self {
        Config {
            ephemeral: true,
            ..Config::default()
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let cache_dir = dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from("cache"))
            .join("shade");

        Self {
            cache_dir,
            ephemeral: false,
        }
    }
}
