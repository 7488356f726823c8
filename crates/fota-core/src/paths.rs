//! Endpoint paths of the FOTA API, relative to the service base URL

/// Largest `per_page` value the list endpoints accept
pub const MAX_PER_PAGE: u32 = 200;

pub const AVAILABLE_UPDATES: &str = "/api/fota/available_updates";
pub const JOBS: &str = "/api/fota/jobs";
pub const JOBS_BULK: &str = "/api/fota/jobs/bulk";
pub const JOBS_DOWNLOADED_CANCEL: &str = "/api/fota/jobs/downloaded/cancel";
pub const JOBS_UPDATE: &str = "/api/fota/jobs/update";
pub const JOBS_CANCEL: &str = "/api/fota/jobs/cancel";
pub const JOBS_RETRY: &str = "/api/fota/jobs/retry";

/// Prefix of signed firmware download links
pub const FIRMWARE_DOWNLOAD_PREFIX: &str = "/api/fota/firmware/download";

/// `GET /api/fota/device/{uid}/history`
pub fn device_history(uid: &str) -> String {
    format!("/api/fota/device/{}/history", uid)
}

/// `GET /api/fota/firmware/download/{file}`
pub fn firmware_download(file: &str) -> String {
    format!("{}/{}", FIRMWARE_DOWNLOAD_PREFIX, file)
}
