//! The provider: shared client, time budgets and progress reporting
//!
//! A [`Provider`] is built once by the host and passed to every lifecycle
//! callback. It hands out the per-service facades.

use crate::bi::BiService;
use crate::cfs::CfsService;
use crate::client::{CloudClient, HttpTransport};
use crate::config::ResolvedProfile;
use crate::dc::DcService;
use crate::eks::EksService;
use crate::error::Result;
use crate::postgresql::PostgresqlService;
use crate::progress::{
    OperationHandle, OperationStatus, PollReport, ProgressCallback, poll_operation,
    wait_until_gone,
};
use crate::sqlserver::SqlserverService;
use crate::timeouts::Timeouts;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct Provider {
    client: CloudClient,
    timeouts: Timeouts,
    progress: Option<ProgressCallback>,
}

impl std::fmt::Debug for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Provider")
            .field("client", &self.client)
            .field("timeouts", &self.timeouts)
            .field("progress", &self.progress.is_some())
            .finish()
    }
}

impl Provider {
    pub fn new(client: CloudClient) -> Self {
        Self {
            client,
            timeouts: Timeouts::default(),
            progress: None,
        }
    }

    /// Build an HTTPS provider from a resolved profile
    pub fn from_profile(profile: &ResolvedProfile) -> Result<Self> {
        let transport = HttpTransport::new(profile.credential.clone(), profile.client.clone())?;
        let client = CloudClient::new(Arc::new(transport), profile.region.clone())
            .with_rate_limit(profile.resilience.rate_limit());
        Ok(Self::new(client).with_timeouts(profile.resilience.timeouts()))
    }

    pub fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    pub fn with_progress(mut self, progress: ProgressCallback) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn client(&self) -> &CloudClient {
        &self.client
    }

    pub fn timeouts(&self) -> &Timeouts {
        &self.timeouts
    }

    pub fn progress(&self) -> Option<&ProgressCallback> {
        self.progress.as_ref()
    }

    pub fn cfs(&self) -> CfsService {
        CfsService::new(self.client.clone())
    }

    pub fn sqlserver(&self) -> SqlserverService {
        SqlserverService::new(self.client.clone())
    }

    pub fn postgresql(&self) -> PostgresqlService {
        PostgresqlService::new(self.client.clone())
    }

    pub fn dc(&self) -> DcService {
        DcService::new(self.client.clone())
    }

    pub fn eks(&self) -> EksService {
        EksService::new(self.client.clone())
    }

    pub fn bi(&self) -> BiService {
        BiService::new(self.client.clone())
    }

    /// [`poll_operation`] with this provider's interval and progress callback
    pub async fn wait_for<F, Fut>(
        &self,
        handle: impl Into<OperationHandle>,
        timeout: Duration,
        query: F,
    ) -> Result<PollReport>
    where
        F: FnMut(&OperationHandle) -> Fut,
        Fut: Future<Output = Result<OperationStatus>>,
    {
        poll_operation(
            &handle.into(),
            timeout,
            self.timeouts.poll_interval,
            query,
            self.progress(),
        )
        .await
    }

    /// [`wait_until_gone`] with this provider's interval and progress callback
    pub async fn wait_gone<F, Fut>(
        &self,
        handle: impl Into<OperationHandle>,
        timeout: Duration,
        exists: F,
    ) -> Result<PollReport>
    where
        F: FnMut(&OperationHandle) -> Fut,
        Fut: Future<Output = Result<bool>>,
    {
        wait_until_gone(
            &handle.into(),
            timeout,
            self.timeouts.poll_interval,
            exists,
            self.progress(),
        )
        .await
    }
}
