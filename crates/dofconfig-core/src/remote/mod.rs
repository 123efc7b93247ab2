//! Config Tool Service
//!
//! Queries the latest published config version and downloads config bundles.
//!
//! ## Usage
//!
//! ```ignore
//! let client = ConfigToolClient::new(DEFAULT_ENDPOINT)?;
//! let latest = client.latest_version()?;
//! let artifact = ConfigFetcher::new(&client).download("my-api-key")?;
//! println!("v{latest}: {} bytes at {}", artifact.size(), artifact.path().display());
//! // the temporary archive is removed when `artifact` goes out of scope
//! ```

mod client;
mod error;
mod fetcher;

pub use client::{ConfigSource, ConfigToolClient, DEFAULT_ENDPOINT};
pub use error::{FetchError, RemoteError};
pub use fetcher::{ConfigFetcher, DownloadArtifact, DEFAULT_SAVE_FILE, MIN_ARCHIVE_SIZE};
