//! # tencentcloud-core
//!
//! Lifecycle callbacks for Tencent Cloud resources, and the machinery they
//! share.
//!
//! - [`client`] signs and sends Tencent Cloud API 3.0 requests.
//! - [`retry`] re-runs a call while its error is retryable, within a time budget.
//! - [`progress`] polls an asynchronous operation (a flow, task or instance
//!   status) until it is terminal, reporting every check to an optional callback.
//! - [`resource`] defines the [`Resource`](resource::Resource) and
//!   [`DataSource`](resource::DataSource) traits, plus a type-name registry.
//! - The service modules ([`cfs`], [`dc`], [`eks`], [`sqlserver`],
//!   [`postgresql`], [`bi`]) implement them.
//!
//! ## Example
//!
//! ```no_run
//! use tencentcloud_core::config::Config;
//! use tencentcloud_core::resource::lookup_resource;
//! use tencentcloud_core::Provider;
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::load()?;
//! let name = config.resolve_profile_name(None)?;
//! let profile = config.profile(&name)?.resolve(&name)?;
//! let provider = Provider::from_profile(&profile)?;
//!
//! let resource = lookup_resource("tencentcloud_cfs_file_system").ok_or("unknown type")?;
//! let data = resource
//!     .create(
//!         &provider,
//!         json!({
//!             "name": "shared",
//!             "availability_zone": "ap-guangzhou-3",
//!             "access_group_id": "pgroup-7nx89k7l",
//!             "vpc_id": "vpc-ah9fbkap",
//!             "subnet_id": "subnet-9mu2t9iw",
//!         }),
//!     )
//!     .await?;
//! println!("created {}", data.id);
//! # Ok(())
//! # }
//! ```

pub mod bi;
pub mod cfs;
pub mod client;
pub mod config;
pub mod dc;
pub mod eks;
pub mod error;
pub mod postgresql;
pub mod progress;
pub mod provider;
pub mod resource;
pub mod retry;
pub mod sqlserver;
pub mod timeouts;

/// Separator between the parts of a composite resource id
pub const ID_SEPARATOR: &str = "#";

pub use client::{ApiTransport, CloudClient, Service, build_id, split_id};
pub use error::{CoreError, Result, ResultExt, SdkError};
pub use progress::{
    OperationHandle, OperationStatus, PollReport, ProgressCallback, ProgressEvent,
    poll_operation, wait_until_gone,
};
pub use provider::Provider;
pub use retry::{Attempt, RetryPolicy, retry, retry_call};
pub use timeouts::Timeouts;
