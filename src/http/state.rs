use crate::collection::MetricManager;
use std::sync::Arc;

#[derive(Clone, Debug)]
pub struct HttpServerState {
    pub name: Arc<String>,
    pub manager: Arc<MetricManager>,
}
