//! Navigable locations of the back office.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Login,
    Dashboard,
    Clients,
    ClientAdd,
    ClientDetails(i64),
    PolicyAdd,
    PolicyDetails(i64),
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Login => "/login".to_string(),
            Route::Dashboard => "/".to_string(),
            Route::Clients => "/clients".to_string(),
            Route::ClientAdd => "/clients/add".to_string(),
            Route::ClientDetails(id) => format!("/clients/{}", id),
            Route::PolicyAdd => "/policies/add".to_string(),
            Route::PolicyDetails(id) => format!("/policies/{}", id),
        }
    }

    /// Everything except the login page needs a session.
    pub fn is_protected(&self) -> bool {
        !matches!(self, Route::Login)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("No page at {0}")]
pub struct UnknownRoute(pub String);

impl FromStr for Route {
    type Err = UnknownRoute;

    fn from_str(path: &str) -> Result<Self, Self::Err> {
        let trimmed = path.trim().trim_end_matches('/');
        let segments: Vec<&str> = trimmed
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();

        let route = match segments.as_slice() {
            [] => Route::Dashboard,
            ["login"] => Route::Login,
            ["clients"] => Route::Clients,
            ["clients", "add"] => Route::ClientAdd,
            ["clients", id] => Route::ClientDetails(parse_id(id, path)?),
            ["policies", "add"] => Route::PolicyAdd,
            ["policies", id] => Route::PolicyDetails(parse_id(id, path)?),
            _ => return Err(UnknownRoute(path.to_string())),
        };
        Ok(route)
    }
}

fn parse_id(segment: &str, path: &str) -> Result<i64, UnknownRoute> {
    segment
        .parse()
        .map_err(|_| UnknownRoute(path.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_routes() {
        assert_eq!("/".parse(), Ok(Route::Dashboard));
        assert_eq!("/login".parse(), Ok(Route::Login));
        assert_eq!("/clients/".parse(), Ok(Route::Clients));
        assert_eq!("/clients/add".parse(), Ok(Route::ClientAdd));
        assert_eq!("/clients/12".parse(), Ok(Route::ClientDetails(12)));
        assert_eq!("/policies/add".parse(), Ok(Route::PolicyAdd));
        assert_eq!("/policies/5".parse(), Ok(Route::PolicyDetails(5)));
    }

    #[test]
    fn test_parse_unknown() {
        assert!("/clients/abc".parse::<Route>().is_err());
        assert!("/settings".parse::<Route>().is_err());
        assert!("/policies/1/edit".parse::<Route>().is_err());
    }

    #[test]
    fn test_path_round_trip() {
        for route in [
            Route::Login,
            Route::Dashboard,
            Route::Clients,
            Route::ClientAdd,
            Route::ClientDetails(3),
            Route::PolicyAdd,
            Route::PolicyDetails(9),
        ] {
            assert_eq!(route.path().parse::<Route>(), Ok(route));
        }
    }

    #[test]
    fn test_only_login_is_public() {
        assert!(!Route::Login.is_protected());
        assert!(Route::Dashboard.is_protected());
        assert!(Route::PolicyDetails(1).is_protected());
    }
}
