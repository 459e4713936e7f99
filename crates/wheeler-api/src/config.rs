//! # Server Configuration
//!
//! Every setting is a command-line flag with an environment fallback, so the
//! server runs unchanged from a shell, a container, or a `.env`-driven
//! process manager.

use std::fmt;
use std::path::PathBuf;

use clap::{ArgAction, Args, ValueEnum};

use crate::state::AppConfig;

/// Where uploaded images are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BlobBackend {
    /// Local directory, served back under `/storage`.
    Local,
    /// Google Drive; references are share links rewritten for the CDN.
    Drive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Clone, Args)]
pub struct Settings {
    /// Port to listen on.
    #[arg(long, env = "PORT", default_value_t = 5000)]
    pub port: u16,

    /// HS256 signing secret for bearer tokens.
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: String,

    /// PostgreSQL connection string. Without it the server keeps data in memory only.
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: Option<String>,

    #[arg(long, env = "BLOB_BACKEND", value_enum, default_value_t = BlobBackend::Local)]
    pub blob_backend: BlobBackend,

    /// Root directory for the local blob backend.
    #[arg(long, env = "STORAGE_ROOT", default_value = "storage")]
    pub storage_root: PathBuf,

    /// OAuth access token for the Drive backend.
    #[arg(long, env = "DRIVE_ACCESS_TOKEN", hide_env_values = true)]
    pub drive_access_token: Option<String>,

    /// Drive folder that receives uploads.
    #[arg(long, env = "DRIVE_FOLDER_ID")]
    pub drive_folder_id: Option<String>,

    /// `sandbox` or `production`.
    #[arg(long, env = "BRAINTREE_ENVIRONMENT", default_value = "sandbox")]
    pub braintree_environment: String,

    #[arg(long, env = "BRAINTREE_PUBLIC_KEY")]
    pub braintree_public_key: Option<String>,

    #[arg(long, env = "BRAINTREE_PRIVATE_KEY", hide_env_values = true)]
    pub braintree_private_key: Option<String>,

    /// Allowed browser origins, comma separated.
    #[arg(
        long,
        env = "CORS_ORIGINS",
        value_delimiter = ',',
        default_values = ["http://localhost:3000", "https://wheeler-dealer-frontend.vercel.app"]
    )]
    pub cors_origins: Vec<String>,

    /// Request body limit in bytes (applies to multipart uploads).
    #[arg(long, env = "MAX_UPLOAD_BYTES", default_value_t = 10 * 1024 * 1024)]
    pub max_upload_bytes: usize,

    #[arg(long, env = "METRICS_ENABLED", default_value_t = true, action = ArgAction::Set)]
    pub metrics_enabled: bool,

    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,
}

impl Settings {
    /// Router settings derived from the server settings.
    pub fn app_config(&self) -> AppConfig {
        AppConfig {
            max_upload_bytes: self.max_upload_bytes,
            metrics_enabled: self.metrics_enabled,
            cors_origins: self
                .cors_origins
                .iter()
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect(),
            static_root: match self.blob_backend {
                BlobBackend::Local => Some(self.storage_root.clone()),
                BlobBackend::Drive => None,
            },
        }
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("port", &self.port)
            .field("jwt_secret", &"[REDACTED]")
            .field("database_url", &self.database_url.as_ref().map(|_| "[REDACTED]"))
            .field("blob_backend", &self.blob_backend)
            .field("storage_root", &self.storage_root)
            .field(
                "drive_access_token",
                &self.drive_access_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("drive_folder_id", &self.drive_folder_id)
            .field("braintree_environment", &self.braintree_environment)
            .field("braintree_public_key", &self.braintree_public_key)
            .field(
                "braintree_private_key",
                &self.braintree_private_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("cors_origins", &self.cors_origins)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .field("metrics_enabled", &self.metrics_enabled)
            .field("log_format", &self.log_format)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        settings: Settings,
    }

    fn parse(args: &[&str]) -> Settings {
        let argv = std::iter::once("wheeler-api").chain(args.iter().copied());
        Harness::try_parse_from(argv).unwrap().settings
    }

    #[test]
    fn flags_override_defaults() {
        let s = parse(&[
            "--jwt-secret",
            "s3cret",
            "--port",
            "8081",
            "--blob-backend",
            "drive",
            "--cors-origins",
            "https://a.example,https://b.example",
            "--metrics-enabled",
            "false",
            "--log-format",
            "json",
        ]);
        assert_eq!(s.port, 8081);
        assert_eq!(s.blob_backend, BlobBackend::Drive);
        assert_eq!(s.cors_origins, ["https://a.example", "https://b.example"]);
        assert!(!s.metrics_enabled);
        assert_eq!(s.log_format, LogFormat::Json);

        let config = s.app_config();
        assert!(config.static_root.is_none());
        assert!(!config.metrics_enabled);
    }

    #[test]
    fn local_backend_serves_storage_root() {
        let s = parse(&["--jwt-secret", "x", "--blob-backend", "local", "--storage-root", "/srv/img"]);
        assert_eq!(s.app_config().static_root, Some(PathBuf::from("/srv/img")));
    }

    #[test]
    fn debug_hides_secrets() {
        let s = parse(&[
            "--jwt-secret",
            "top-secret-value",
            "--braintree-private-key",
            "private-value",
        ]);
        let rendered = format!("{s:?}");
        assert!(!rendered.contains("top-secret-value"));
        assert!(!rendered.contains("private-value"));
        assert!(rendered.contains("[REDACTED]"));
    }
}
