//! Route protection.
//!
//! `RouteGuard` decides whether a route may be shown for the current session.
//! `Navigator` tracks the current location and follows the transport's
//! forced redirects to the login page.

use tokio::sync::{broadcast, watch};
use tracing::{debug, info};

use crate::api::TransportEvent;
use crate::auth::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Register,
    Dashboard,
    Applications,
    NewApplication,
    ApplicationDetail(i64),
    EditApplication(i64),
    Interviews,
    NotFound,
}

impl Route {
    /// Parse a client path. Query strings, fragments and a trailing slash are ignored.
    pub fn parse(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or("");
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            [] => Route::Dashboard,
            ["login"] => Route::Login,
            ["register"] => Route::Register,
            ["applications"] => Route::Applications,
            ["applications", "new"] => Route::NewApplication,
            ["applications", id] => id
                .parse()
                .map(Route::ApplicationDetail)
                .unwrap_or(Route::NotFound),
            ["applications", id, "edit"] => id
                .parse()
                .map(Route::EditApplication)
                .unwrap_or(Route::NotFound),
            ["interviews"] => Route::Interviews,
            _ => Route::NotFound,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Login => "/login".to_string(),
            Route::Register => "/register".to_string(),
            Route::Dashboard => "/".to_string(),
            Route::Applications => "/applications".to_string(),
            Route::NewApplication => "/applications/new".to_string(),
            Route::ApplicationDetail(id) => format!("/applications/{}", id),
            Route::EditApplication(id) => format!("/applications/{}/edit", id),
            Route::Interviews => "/interviews".to_string(),
            Route::NotFound => "/404".to_string(),
        }
    }

    pub fn is_public(&self) -> bool {
        matches!(self, Route::Login | Route::Register)
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path())
    }
}

/// Guard decision for one navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Allow,
    /// The session is still being restored; render nothing protected yet.
    Pending,
    Redirect(Route),
}

/// Decide access to `route` for `session`.
pub fn check_access(session: &Session, route: Route) -> Access {
    if session.is_loading() {
        return Access::Pending;
    }
    if route.is_public() {
        return Access::Allow;
    }
    match (route, session.is_authenticated()) {
        (Route::NotFound, true) => Access::Redirect(Route::Dashboard),
        (_, true) => Access::Allow,
        (_, false) => Access::Redirect(Route::Login),
    }
}

/// Read-only consumer of the session.
#[derive(Clone)]
pub struct RouteGuard {
    session: watch::Receiver<Session>,
}

impl RouteGuard {
    pub fn new(session: watch::Receiver<Session>) -> Self {
        Self { session }
    }

    pub fn check(&self, route: Route) -> Access {
        check_access(&self.session.borrow(), route)
    }

    /// Wait until the startup restore has finished.
    pub async fn wait_until_ready(&mut self) {
        // Err means the manager is gone; its last state is final either way.
        let _ = self.session.wait_for(|s| !s.is_loading()).await;
    }
}

pub struct Navigator {
    guard: RouteGuard,
    events: broadcast::Receiver<TransportEvent>,
    location: Route,
}

impl Navigator {
    pub fn new(guard: RouteGuard, events: broadcast::Receiver<TransportEvent>) -> Self {
        Self {
            guard,
            events,
            location: Route::Dashboard,
        }
    }

    pub fn location(&self) -> Route {
        self.location
    }

    /// Navigate to `path`, following a guard redirect. While the session is
    /// loading the location does not change.
    pub fn navigate(&mut self, path: &str) -> Access {
        let route = Route::parse(path);
        let access = self.guard.check(route);
        match access {
            Access::Allow => self.location = route,
            Access::Redirect(target) => {
                debug!(from = %route, to = %target, "Route guard redirect");
                self.location = target;
            }
            Access::Pending => {}
        }
        access
    }

    /// Apply pending transport events. Returns true if a forced redirect happened.
    pub fn poll_events(&mut self) -> bool {
        let mut redirected = false;
        loop {
            match self.events.try_recv() {
                Ok(event) => {
                    self.apply(event);
                    redirected = true;
                }
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    debug!(skipped, "Navigator lagged behind transport events");
                }
                Err(_) => break,
            }
        }
        redirected
    }

    // Forced navigation bypasses the guard, like a hard page load.
    fn apply(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::SessionExpired { redirect_to } => {
                info!(to = %redirect_to, "Session expired, forcing navigation");
                self.location = Route::parse(&redirect_to);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::User;

    #[test]
    fn test_parse_routes() {
        assert_eq!(Route::parse("/"), Route::Dashboard);
        assert_eq!(Route::parse(""), Route::Dashboard);
        assert_eq!(Route::parse("/login"), Route::Login);
        assert_eq!(Route::parse("/register/"), Route::Register);
        assert_eq!(Route::parse("/applications"), Route::Applications);
        assert_eq!(Route::parse("/applications/new"), Route::NewApplication);
        assert_eq!(Route::parse("/applications/42"), Route::ApplicationDetail(42));
        assert_eq!(Route::parse("/applications/42/edit"), Route::EditApplication(42));
        assert_eq!(Route::parse("/interviews?week=3"), Route::Interviews);
        assert_eq!(Route::parse("/applications/abc"), Route::NotFound);
        assert_eq!(Route::parse("/settings"), Route::NotFound);
    }

    #[test]
    fn test_route_paths_round_trip() {
        for route in [
            Route::Login,
            Route::Register,
            Route::Dashboard,
            Route::Applications,
            Route::NewApplication,
            Route::ApplicationDetail(7),
            Route::EditApplication(7),
            Route::Interviews,
        ] {
            assert_eq!(Route::parse(&route.path()), route);
        }
    }

    fn alice() -> User {
        User {
            id: Some(1),
            username: "alice".to_string(),
            email: None,
            first_name: None,
            last_name: None,
        }
    }

    #[test]
    fn test_guard_pending_while_loading() {
        let loading = Session::with_state(None, true);
        assert_eq!(check_access(&loading, Route::Dashboard), Access::Pending);
        assert_eq!(check_access(&loading, Route::Login), Access::Pending);
    }

    #[test]
    fn test_guard_anonymous() {
        let anonymous = Session::with_state(None, false);
        assert_eq!(check_access(&anonymous, Route::Login), Access::Allow);
        assert_eq!(check_access(&anonymous, Route::Register), Access::Allow);
        assert_eq!(
            check_access(&anonymous, Route::ApplicationDetail(3)),
            Access::Redirect(Route::Login)
        );
        assert_eq!(
            check_access(&anonymous, Route::NotFound),
            Access::Redirect(Route::Login)
        );
    }

    #[test]
    fn test_guard_authenticated() {
        let session = Session::with_state(Some(alice()), false);
        assert_eq!(check_access(&session, Route::Interviews), Access::Allow);
        assert_eq!(check_access(&session, Route::Login), Access::Allow);
        assert_eq!(
            check_access(&session, Route::NotFound),
            Access::Redirect(Route::Dashboard)
        );
    }

    #[test]
    fn test_navigator_follows_guard_and_forced_redirects() {
        let (session_tx, session_rx) = watch::channel(Session::with_state(None, true));
        let (events_tx, events_rx) = broadcast::channel(4);
        let mut navigator = Navigator::new(RouteGuard::new(session_rx), events_rx);

        assert_eq!(navigator.navigate("/applications"), Access::Pending);
        assert_eq!(navigator.location(), Route::Dashboard);

        session_tx.send_replace(Session::with_state(Some(alice()), false));
        assert_eq!(navigator.navigate("/applications"), Access::Allow);
        assert_eq!(navigator.location(), Route::Applications);

        assert!(!navigator.poll_events());
        events_tx
            .send(TransportEvent::SessionExpired {
                redirect_to: "/login".to_string(),
            })
            .unwrap();
        assert!(navigator.poll_events());
        assert_eq!(navigator.location(), Route::Login);
    }

    #[test]
    fn test_route_public() {
        assert!(Route::Login.is_public());
        assert!(Route::Register.is_public());
        assert!(!Route::Dashboard.is_public());
        assert!(!Route::NotFound.is_public());
    }
}
