use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::control_system::intersection::IntersectionId;
use crate::error::ControlError;

/// A named emergency route and the intersections it passes through, in travel order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub name: String,
    pub intersections: Vec<IntersectionId>,
}

impl Route {
    pub fn new(name: &str, intersections: Vec<IntersectionId>) -> Self {
        Self {
            name: name.to_string(),
            intersections,
        }
    }
}

/// Read-only lookup from route name to intersections. Built once at startup.
#[derive(Debug, Clone, Default)]
pub struct RouteRegistry {
    routes: Vec<Route>,
}

impl RouteRegistry {
    /// Rejects routes with an empty name, no intersections, or a duplicate name.
    pub fn new(routes: Vec<Route>) -> Result<Self, ControlError> {
        let mut names = HashSet::new();
        for route in &routes {
            if route.name.trim().is_empty() {
                return Err(ControlError::InvalidRoute("route name is empty".to_string()));
            }
            if route.intersections.is_empty() {
                return Err(ControlError::InvalidRoute(format!(
                    "route '{}' has no intersections",
                    route.name
                )));
            }
            if !names.insert(route.name.as_str()) {
                return Err(ControlError::InvalidRoute(format!(
                    "duplicate route '{}'",
                    route.name
                )));
            }
        }
        Ok(Self { routes })
    }

    pub fn get(&self, name: &str) -> Option<&Route> {
        self.routes.iter().find(|route| route.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Intersections on the named route. Unknown names yield an empty slice.
    pub fn intersections_for(&self, name: &str) -> &[IntersectionId] {
        self.get(name)
            .map(|route| route.intersections.as_slice())
            .unwrap_or(&[])
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }
}
