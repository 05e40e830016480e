use std::env;

use crate::errors::AppError;
use crate::services::booking::SlotGuard;
use crate::services::slots::SlotGrid;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    pub open_hour: u32,
    pub close_hour: u32,
    pub slot_guard: SlotGuard,
    pub bootstrap_admin_id: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "fixitright.db".to_string()),
            open_hour: env::var("OPEN_HOUR")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(9),
            close_hour: env::var("CLOSE_HOUR")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(17),
            slot_guard: env::var("SLOT_GUARD")
                .map(|v| SlotGuard::parse(&v))
                .unwrap_or_default(),
            bootstrap_admin_id: env::var("BOOTSTRAP_ADMIN_ID")
                .ok()
                .filter(|v| !v.trim().is_empty()),
        }
    }

    pub fn slot_grid(&self) -> Result<SlotGrid, AppError> {
        SlotGrid::new(self.open_hour, self.close_hour)
    }
}
