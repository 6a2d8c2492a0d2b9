//! # fastmask-client
//!
//! Client library for creating Fastmail masked email aliases over JMAP.
//!
//! A run is strictly sequential: load the API token from a
//! permission-checked config file, fetch the JMAP session document to
//! discover the API endpoint and account id, then issue one
//! `MaskedEmail/set` call. Nothing is retried and nothing is cached;
//! every failure aborts the run.
//!
//! ## Example
//!
//! ```no_run
//! use fastmask_client::{JmapClient, config};
//!
//! # async fn example() -> Result<(), fastmask_client::ClientError> {
//! let token = config::load_token()?;
//! let client = JmapClient::new(token)?;
//!
//! let identity = client.bootstrap().await?;
//! let alias = client.create_alias(&identity, "example.org").await?;
//!
//! println!("{}", alias.email);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod jmap;
pub mod perms;
pub mod prefix;
pub mod token;

pub use error::ClientError;
pub use jmap::{AliasResult, Identity, JmapClient};
pub use token::SecureToken;
