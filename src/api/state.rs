use crate::service::dashboard::DashboardService;

/**
* Represents the application state shared across the Actix web application.
*/
pub struct AppState {
    /**
     * The dashboard service answering control and figure requests.
     */
    pub dashboard_service: DashboardService,
}

/**
 * Creates a new instance of `AppState`.
 *
 * # Arguments
 * `dashboard_service`: The dashboard service built around the merged table.
 */
impl AppState {
    pub fn new(dashboard_service: DashboardService) -> Self {
        AppState { dashboard_service }
    }
}
