use serde::Serialize;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Number of records a bulk operation touched.
#[derive(Serialize)]
pub struct CountResponse {
    pub count: u64,
}
