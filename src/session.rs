//! Owned analysis session.
//!
//! A [`Session`] holds at most one [`Dataset`]. Ingestion replaces it
//! wholesale, and only after the new text has been parsed successfully, so a
//! failed load leaves the previous dataset and its analysis log untouched.

use log::{info, warn};

use crate::{
    dataset::Dataset,
    error::{AnalysisError, Result},
    hypothesis::{TestRequest, TestResult},
    regression::{RegressionResult, linear_regression},
};

#[derive(Debug, Default)]
pub struct Session {
    dataset: Option<Dataset>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses `text` and makes it the current dataset.
    pub fn ingest(&mut self, file_name: Option<&str>, text: &str) -> Result<&Dataset> {
        let parsed = Dataset::parse(file_name, text).inspect_err(|err| {
            warn!("Ingestion failed, keeping the previous dataset: {err}");
        })?;
        if self.dataset.is_some() {
            info!("Replacing the loaded dataset");
        }
        Ok(self.dataset.insert(parsed))
    }

    pub fn dataset(&self) -> Result<&Dataset> {
        self.dataset.as_ref().ok_or_else(no_dataset)
    }

    pub fn is_loaded(&self) -> bool {
        self.dataset.is_some()
    }

    /// Runs a test against the current dataset and logs its conclusion.
    pub fn run_test(&mut self, request: &TestRequest) -> Result<TestResult> {
        let result = request.run(self.dataset()?)?;
        self.record_test(&result)?;
        Ok(result)
    }

    /// Appends `Performed <test>. Result Summary: <conclusion>` to the log.
    pub fn record_test(&mut self, result: &TestResult) -> Result<()> {
        let dataset = self.dataset.as_mut().ok_or_else(no_dataset)?;
        dataset.log_analysis(format!(
            "Performed {}. Result Summary: {}",
            result.test_name,
            result.conclusion()
        ));
        Ok(())
    }

    pub fn run_regression(&mut self, predictor: &str, response: &str) -> Result<RegressionResult> {
        let result = linear_regression(self.dataset()?, predictor, response)?;
        self.record_regression(&result)?;
        Ok(result)
    }

    pub fn record_regression(&mut self, result: &RegressionResult) -> Result<()> {
        let dataset = self.dataset.as_mut().ok_or_else(no_dataset)?;
        dataset.log_analysis(result.log_entry());
        Ok(())
    }

    /// The analysis log as one block of text, entries separated by blank
    /// lines. Empty when nothing is loaded.
    pub fn report_context(&self) -> String {
        self.dataset
            .as_ref()
            .map(|dataset| dataset.analysis_log().join("\n\n"))
            .unwrap_or_default()
    }

    pub fn dataset_overview(&self) -> Result<String> {
        self.dataset().map(Dataset::overview)
    }
}

fn no_dataset() -> AnalysisError {
    AnalysisError::MissingArgument {
        operation: "Analysis".to_string(),
        argument: "a loaded dataset".to_string(),
    }
}
