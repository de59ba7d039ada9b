#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("No forecast periods were supplied")]
    NoForecastPeriods,
    #[error("Invalid geography: {0}")]
    InvalidGeography(String),
    #[error("Malformed payload: {0}")]
    Payload(String),
    #[error("Failed to decode JSON: {0}")]
    Json(#[from] serde_json::Error),
}
