use crate::models::redirect::{DEFAULT_INDEX, KeyOptions};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::{
    env, fs, io,
    path::{Path, PathBuf},
};
use thiserror::Error;

const DEFAULT_KEY_FILE: &str = "~/.awssecret";
const DEFAULT_REGION: &str = "us-east-1";

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Redirects file, or `None` for stdin.
    pub redirects: Option<PathBuf>,
    pub bucket: String,
    pub delete: bool,
    pub dry_run: bool,
    pub key_file: PathBuf,
    pub s3: S3Settings,
    pub key_options: KeyOptions,
    pub format: OutputFormat,
}

/// Where and how to reach the object store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3Settings {
    pub region: String,
    pub endpoint_url: Option<String>,
    pub path_style: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// `<verb> <key> <location>` per line
    Text,
    /// One JSON object per line
    Json,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Sync a list of redirects to an Amazon S3 bucket",
    after_help = "Amazon access key and secret key should be stored on the first and second lines of the key file."
)]
pub struct Args {
    /// File containing key names and redirect locations, separated by a
    /// space and listed one per line (`-` for stdin)
    pub redirects: String,

    /// Name of the S3 bucket
    pub bucket: String,

    /// Also delete all redirects not listed in the redirects file
    #[arg(short, long)]
    pub delete: bool,

    /// Display changes to be made without actually making them
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Key file (overrides S3REDIRECT_KEY_FILE, default ~/.awssecret)
    #[arg(long, value_name = "FILE")]
    pub key: Option<String>,

    /// Signing region (overrides S3REDIRECT_REGION / AWS_REGION)
    #[arg(long)]
    pub region: Option<String>,

    /// S3-compatible endpoint (overrides S3REDIRECT_ENDPOINT_URL)
    #[arg(long)]
    pub endpoint_url: Option<String>,

    /// Use path-style bucket addressing
    #[arg(long)]
    pub path_style: bool,

    /// Appended to keys ending in `/` (empty to append nothing)
    #[arg(long, default_value = DEFAULT_INDEX)]
    pub index: String,

    /// Keep a leading `/` on keys instead of stripping it
    #[arg(long)]
    pub keep_leading_slash: bool,

    /// Action log format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig.
    pub fn from_env_and_args() -> Result<Self> {
        Self::from_args(Args::parse(), |name| env::var(name))
    }

    /// Merge parsed args with an environment lookup. CLI wins over env,
    /// env wins over built-in defaults.
    pub fn from_args<F>(args: Args, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Result<String, env::VarError>,
    {
        let var = |name: &str| -> Result<Option<String>> {
            match lookup(name) {
                Ok(value) => Ok(Some(value)),
                Err(env::VarError::NotPresent) => Ok(None),
                Err(err) => Err(err).with_context(|| format!("reading {}", name)),
            }
        };

        // --- Environment fallback ---
        let env_key = var("S3REDIRECT_KEY_FILE")?;
        let env_region = match var("S3REDIRECT_REGION")? {
            Some(region) => Some(region),
            None => var("AWS_REGION")?,
        };
        let env_endpoint = var("S3REDIRECT_ENDPOINT_URL")?;
        let home = var("HOME")?;

        // --- Merge ---
        let key_file = args
            .key
            .or(env_key)
            .unwrap_or_else(|| DEFAULT_KEY_FILE.into());

        Ok(Self {
            redirects: match args.redirects.as_str() {
                "-" => None,
                path => Some(PathBuf::from(path)),
            },
            bucket: args.bucket,
            delete: args.delete,
            dry_run: args.dry_run,
            key_file: expand_home(&key_file, home.as_deref()),
            s3: S3Settings {
                region: args
                    .region
                    .or(env_region)
                    .unwrap_or_else(|| DEFAULT_REGION.into()),
                endpoint_url: args.endpoint_url.or(env_endpoint),
                path_style: args.path_style,
            },
            key_options: KeyOptions {
                remove_slash: !args.keep_leading_slash,
                index: args.index,
            },
            format: args.format,
        })
    }
}

/// Expand a leading `~` against `home`. Paths are returned untouched when
/// there is no home directory to expand to.
fn expand_home(path: &str, home: Option<&str>) -> PathBuf {
    match (path, home) {
        ("~", Some(home)) => PathBuf::from(home),
        (p, Some(home)) if p.starts_with("~/") => Path::new(home).join(&p[2..]),
        (p, _) => PathBuf::from(p),
    }
}

/// Access key pair read from the key file.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_key: String,
    pub secret_key: String,
}

// keep the secret out of logs
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum CredentialsError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{} must hold the access key and secret key on its first two lines", path.display())]
    Malformed { path: PathBuf },
}

impl Credentials {
    /// Read the first two lines of `path` as access key and secret key.
    pub fn from_key_file(path: &Path) -> Result<Self, CredentialsError> {
        let contents = fs::read_to_string(path).map_err(|source| CredentialsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents).ok_or_else(|| CredentialsError::Malformed {
            path: path.to_path_buf(),
        })
    }

    fn parse(contents: &str) -> Option<Self> {
        let mut lines = contents.lines().map(str::trim);
        let access_key = lines.next().filter(|s| !s.is_empty())?;
        let secret_key = lines.next().filter(|s| !s.is_empty())?;
        Some(Self {
            access_key: access_key.to_string(),
            secret_key: secret_key.to_string(),
        })
    }
}
