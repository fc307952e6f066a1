use super::metric_viewmodel::SampleViewModel;
use crate::collection::CollectionReport;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CollectedSampleViewModel {
    pub metric_slug: String,
    #[serde(flatten)]
    pub sample: SampleViewModel,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CollectionFailureViewModel {
    pub metric_slug: String,
    pub error: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CollectionReportViewModel {
    pub collected: Vec<CollectedSampleViewModel>,
    pub failures: Vec<CollectionFailureViewModel>,
}

impl TryFrom<CollectionReport> for CollectionReportViewModel {
    type Error = anyhow::Error;

    fn try_from(report: CollectionReport) -> Result<Self, Self::Error> {
        let collected = report
            .collected
            .into_iter()
            .map(|collected| {
                Ok(CollectedSampleViewModel {
                    metric_slug: collected.metric_slug,
                    sample: SampleViewModel::try_from(collected.sample)?,
                })
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        let failures = report
            .failures
            .into_iter()
            .map(|failure| CollectionFailureViewModel {
                metric_slug: failure.metric_slug,
                error: failure.error,
            })
            .collect();

        Ok(Self {
            collected,
            failures,
        })
    }
}
