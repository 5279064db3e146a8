use thiserror::Error;

use habitat_core::LayoutError;
use habitat_io::DocumentError;
use habitat_sim::ScenarioError;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    Scenario(#[from] ScenarioError),
}
