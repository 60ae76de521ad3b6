use axum::Router;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{delete, get, patch, post, put};
use opsdash_core::AppError;
use tower_http::trace::TraceLayer;
use tower_sessions::{SessionManagerLayer, SessionStore};

use crate::handlers::{crm, holidays, rbac, time_reports};
use crate::state::AppState;
use crate::{auth, handlers, middleware};

mod cors;


pub fn build_router<Store>(
    app_state: AppState,
    frontend_url: &str,
    session_layer: SessionManagerLayer<Store>,
) -> Result<Router, AppError>
where
    Store: SessionStore + Clone,
{
    let protected_routes = Router::new()
        .route("/api/me", get(auth::me_handler))
        .merge(dashboard_routes())
        .merge(crm_routes())
        .merge(rbac_routes())
        .route_layer(from_fn(middleware::require_auth));

    Ok(Router::new()
        .route("/health", get(handlers::health::health_handler))
        .route("/auth/session", post(auth::establish_session_handler))
        .route("/auth/logout", post(auth::logout_handler))
        .merge(protected_routes)
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_same_origin_for_mutations,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors::build_cors_layer(frontend_url)?)
        .layer(session_layer)
        .with_state(app_state))
}

fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/holidays/summary",
            get(holidays::holiday_summary_handler),
        )
        .route(
            "/api/holidays/bank-holidays/{year}",
            get(holidays::bank_holidays_handler),
        )
        .route(
            "/api/absences",
            get(holidays::list_absences_handler).post(holidays::apply_for_absence_handler),
        )
        .route(
            "/api/absences/{absence_id}",
            put(holidays::update_absence_handler).delete(holidays::delete_absence_handler),
        )
        .route(
            "/api/time-reports/{date}",
            get(time_reports::get_time_report_handler)
                .put(time_reports::save_time_report_handler),
        )
}

fn crm_routes() -> Router<AppState> {
    Router::new()
        .route("/api/crm/assignments", get(crm::my_assignments_handler))
        .route("/api/crm/opportunities", get(crm::opportunities_handler))
        .route("/api/crm/timecards", get(crm::timecards_handler))
        .route("/api/crm/records/{object}", post(crm::create_record_handler))
        .route(
            "/api/crm/records/{object}/{record_id}",
            patch(crm::update_record_handler).delete(crm::delete_record_handler),
        )
        .route("/api/occupancy", get(crm::occupancy_handler))
}

fn rbac_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/rbac/users",
            get(rbac::list_users_handler).post(rbac::create_user_handler),
        )
        .route(
            "/api/rbac/users/{user_id}",
            get(rbac::get_user_handler)
                .put(rbac::update_user_handler)
                .delete(rbac::delete_user_handler),
        )
        .route(
            "/api/rbac/users/{user_id}/profile",
            put(rbac::change_user_profile_handler),
        )
        .route(
            "/api/rbac/users/{user_id}/holiday-allowance",
            put(rbac::update_holiday_allowance_handler),
        )
        .route(
            "/api/rbac/users/{user_id}/permission-sets/{permission_set_id}",
            put(rbac::connect_user_permission_set_handler)
                .delete(rbac::disconnect_user_permission_set_handler),
        )
        .route(
            "/api/rbac/profiles",
            get(rbac::list_profiles_handler).post(rbac::create_profile_handler),
        )
        .route(
            "/api/rbac/profiles/{profile_id}",
            get(rbac::get_profile_handler)
                .put(rbac::update_profile_handler)
                .delete(rbac::delete_profile_handler),
        )
        .route(
            "/api/rbac/profiles/{profile_id}/permissions/{permission_id}",
            put(rbac::connect_profile_permission_handler)
                .delete(rbac::disconnect_profile_permission_handler),
        )
        .route(
            "/api/rbac/permission-sets",
            get(rbac::list_permission_sets_handler).post(rbac::create_permission_set_handler),
        )
        .route(
            "/api/rbac/permission-sets/{permission_set_id}",
            get(rbac::get_permission_set_handler)
                .put(rbac::update_permission_set_handler)
                .delete(rbac::delete_permission_set_handler),
        )
        .route(
            "/api/rbac/permission-sets/{permission_set_id}/permissions/{permission_id}",
            put(rbac::connect_permission_set_permission_handler)
                .delete(rbac::disconnect_permission_set_permission_handler),
        )
        .route(
            "/api/rbac/system-permissions",
            get(rbac::list_system_permissions_handler)
                .post(rbac::create_system_permission_handler),
        )
        .route(
            "/api/rbac/system-permissions/{permission_id}",
            delete(rbac::delete_system_permission_handler),
        )
}
