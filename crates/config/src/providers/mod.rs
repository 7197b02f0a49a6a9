use figment::{
    Error, Metadata, Profile, Provider,
    providers::{Env, Format, Toml},
    value::{Dict, Map},
};
use std::path::{Path, PathBuf};

/// Reads `parx.toml`, or the file named by `env_var` when it is set.
///
/// Top-level keys belong to the default profile, `[profile.<name>]` tables to the named profile
/// and override top-level keys for that profile. A missing default file yields no data.
pub(crate) struct TomlFileProvider {
    env_var: Option<&'static str>,
    default: PathBuf,
}

impl TomlFileProvider {
    pub(crate) fn new(env_var: Option<&'static str>, default: impl Into<PathBuf>) -> Self {
        Self { env_var, default: default.into() }
    }

    fn env_val(&self) -> Option<String> {
        self.env_var.and_then(Env::var)
    }

    /// The file to read. Kept absolute, `Toml::file` would search parent directories for a
    /// relative path.
    fn file(&self) -> PathBuf {
        let file = self.env_val().map(PathBuf::from).unwrap_or_else(|| self.default.clone());
        std::path::absolute(&file).unwrap_or(file)
    }

    fn read(&self) -> Result<Map<Profile, Dict>, Error> {
        if let (Some(var), Some(file)) = (self.env_var, self.env_val())
            && !Path::new(&file).exists()
        {
            return Err(format!("config file `{file}` set in env var `{var}` does not exist").into());
        }

        let mut top = Toml::file(self.file()).data()?.remove(&Profile::Default).unwrap_or_default();
        let profiles = top.remove("profile");

        let mut map = Map::new();
        map.insert(Profile::Default, top);
        if let Some(profiles) = profiles {
            let profiles = profiles.into_dict().ok_or("`profile` must be a table")?;
            for (name, value) in profiles {
                let dict = value
                    .into_dict()
                    .ok_or_else(|| Error::from(format!("`profile.{name}` must be a table")))?;
                map.entry(Profile::new(&name)).or_insert_with(Dict::new).extend(dict);
            }
        }
        Ok(map)
    }
}

impl Provider for TomlFileProvider {
    fn metadata(&self) -> Metadata {
        Toml::file(self.file()).metadata()
    }

    fn data(&self) -> Result<Map<Profile, Dict>, Error> {
        self.read()
    }
}
