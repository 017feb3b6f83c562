//! Problem request DTOs

use serde::Deserialize;
use validator::Validate;

use crate::constants::{MAX_CANDIDATE_ID_LENGTH, MAX_LANGUAGE_LENGTH, MAX_SOURCE_CODE_LENGTH};

/// "Run Tests" request
#[derive(Debug, Deserialize, Validate)]
pub struct RunTestsRequest {
    #[validate(length(min = 1, max = MAX_LANGUAGE_LENGTH))]
    pub language: String,

    /// Blank code is rejected by the evaluator, not here
    #[validate(length(max = MAX_SOURCE_CODE_LENGTH))]
    pub code: String,
}

/// "Submit" request
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitSolutionRequest {
    #[validate(length(min = 1, max = MAX_CANDIDATE_ID_LENGTH))]
    pub candidate_id: String,

    #[validate(length(min = 1, max = MAX_LANGUAGE_LENGTH))]
    pub language: String,

    #[validate(length(max = MAX_SOURCE_CODE_LENGTH))]
    pub code: String,
}
