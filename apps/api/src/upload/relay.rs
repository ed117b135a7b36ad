use crate::ml_client::{MlError, MlService};
use crate::models::resume::ParsedResume;
use crate::upload::storage::StoredUpload;

/// Hands the stored file to the parser, then removes it whatever the outcome.
pub async fn relay_resume(
    ml: &dyn MlService,
    upload: StoredUpload,
) -> Result<ParsedResume, MlError> {
    let outcome = ml.parse_resume(&upload).await;
    upload.discard();
    outcome
}
