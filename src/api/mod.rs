pub mod attendance;
pub mod context;
pub mod leave;
pub mod reference;
pub mod reports;
pub mod staff;

use serde::Deserialize;

use crate::store::SharedConnector;

/// Shared by every handler: where services open their store handles.
#[derive(Clone)]
pub struct AppState {
    pub connector: SharedConnector,
}

impl AppState {
    pub fn new(connector: SharedConnector) -> Self {
        Self { connector }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct DeleteQuery {
    #[serde(default)]
    pub permanent: bool,
}

/// Build a service, make one call, release the service whatever the outcome.
macro_rules! with_service {
    ($service:expr, |$svc:ident| $call:expr) => {{
        let $svc = $service.await?;
        let result = $call.await;
        $svc.end_service().await;
        result
    }};
}

pub(crate) use with_service;
