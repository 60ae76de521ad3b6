use std::sync::Arc;

use opsdash_application::{
    AccessService, CrmService, HolidayService, RbacAdminService, RbacRepository,
    TimeReportService,
};
use opsdash_core::AppError;
use opsdash_domain::SwedishHolidayCalendar;
use opsdash_infrastructure::PostgresRbacRepository;
use sqlx::PgPool;

use crate::api_config::ApiConfig;
use crate::state::AppState;

use super::redis::build_redis_client;

mod caches;
mod integrations;

pub fn build_app_state(pool: PgPool, config: &ApiConfig) -> Result<AppState, AppError> {
    let redis_client = config
        .redis_url
        .as_deref()
        .map(build_redis_client)
        .transpose()?;

    let http_client = reqwest::Client::builder()
        .build()
        .map_err(|error| AppError::Internal(format!("failed to build http client: {error}")))?;

    let rbac_repository: Arc<dyn RbacRepository> = Arc::new(PostgresRbacRepository::new(pool));
    let access_service = AccessService::new(rbac_repository.clone());
    let cache_policy = caches::build_cache_policy(config, redis_client);
    let integrations = integrations::build_integrations(http_client, config)?;

    Ok(AppState {
        holiday_service: HolidayService::new(
            access_service.clone(),
            integrations.hr_system.clone(),
            cache_policy.clone(),
            Arc::new(SwedishHolidayCalendar::default()),
        ),
        time_report_service: TimeReportService::new(
            access_service.clone(),
            integrations.hr_system,
            integrations.notifier,
        ),
        crm_service: CrmService::new(
            access_service.clone(),
            integrations.crm_gateway,
            cache_policy,
        ),
        rbac_admin_service: RbacAdminService::new(access_service.clone(), rbac_repository),
        access_service,
        frontend_url: config.frontend_url.clone(),
        auth_proxy_header: config.auth_proxy_header.clone(),
    })
}
