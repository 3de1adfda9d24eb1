//! Per-mode route planning.

use super::geo::{haversine_km, LatLon};
use super::{DirectionsProvider, ModeSelection, RouteLookup, RouteOutcome, TravelMode};
use crate::markers::MarkerStore;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Walking routes are not requested beyond this straight-line distance.
pub const DEFAULT_WALKING_LIMIT_KM: f64 = 100.0;

/// Outcome for one travel mode.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModeResult {
    pub mode: TravelMode,
    pub outcome: RouteOutcome,
}

/// Results for every requested mode between two points.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoutePlan {
    pub origin: LatLon,
    pub destination: LatLon,
    pub straight_line_km: f64,
    pub results: Vec<ModeResult>,
}

impl RoutePlan {
    pub fn outcome(&self, mode: TravelMode) -> Option<&RouteOutcome> {
        self.results
            .iter()
            .find(|r| r.mode == mode)
            .map(|r| &r.outcome)
    }
}

/// Plans routes through a directions provider.
#[derive(Debug)]
pub struct RoutePlanner<P> {
    provider: P,
    walking_limit_km: f64,
}

impl<P: DirectionsProvider> RoutePlanner<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            walking_limit_km: DEFAULT_WALKING_LIMIT_KM,
        }
    }

    pub fn with_walking_limit(mut self, limit_km: f64) -> Self {
        self.walking_limit_km = limit_km;
        self
    }

    /// Look up every selected mode between two points.
    ///
    /// A failure for one mode is reported as `Unavailable` and does not
    /// prevent the other mode from being looked up.
    pub fn plan(
        &self,
        origin: LatLon,
        destination: LatLon,
        selection: ModeSelection,
    ) -> Result<RoutePlan> {
        if origin == destination {
            return Err(Error::InvalidInput(
                "origin and destination must differ".to_string(),
            ));
        }

        let straight_line_km = haversine_km(origin, destination);
        let results = selection
            .modes()
            .iter()
            .map(|&mode| ModeResult {
                mode,
                outcome: self.lookup(origin, destination, mode, straight_line_km),
            })
            .collect();

        Ok(RoutePlan {
            origin,
            destination,
            straight_line_km,
            results,
        })
    }

    /// Plan between two saved markers identified by label.
    pub fn plan_between<S: MarkerStore + ?Sized>(
        &self,
        store: &S,
        origin_label: &str,
        destination_label: &str,
        selection: ModeSelection,
    ) -> Result<RoutePlan> {
        if origin_label == destination_label {
            return Err(Error::InvalidInput(
                "origin and destination must be different markers".to_string(),
            ));
        }

        let origin = store
            .find_by_label(origin_label)?
            .ok_or_else(|| Error::MarkerNotFound(origin_label.to_string()))?;
        let destination = store
            .find_by_label(destination_label)?
            .ok_or_else(|| Error::MarkerNotFound(destination_label.to_string()))?;

        self.plan(
            LatLon::new(origin.latitude, origin.longitude),
            LatLon::new(destination.latitude, destination.longitude),
            selection,
        )
    }

    fn lookup(
        &self,
        origin: LatLon,
        destination: LatLon,
        mode: TravelMode,
        straight_line_km: f64,
    ) -> RouteOutcome {
        if mode == TravelMode::Walking && straight_line_km > self.walking_limit_km {
            tracing::info!(
                straight_line_km,
                limit_km = self.walking_limit_km,
                "Skipping walking lookup beyond distance limit"
            );
            return RouteOutcome::LimitExceeded {
                straight_line_km,
                limit_km: self.walking_limit_km,
            };
        }

        match self.provider.directions(origin, destination, mode) {
            Ok(RouteLookup::Found(route)) => RouteOutcome::Found(route),
            Ok(RouteLookup::NoRoute) => RouteOutcome::NoRoute {
                message: format!("No {} route found", mode),
            },
            Err(e) => {
                tracing::warn!(mode = %mode, "Directions provider failed: {}", e);
                RouteOutcome::Unavailable {
                    message: e.to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markers::MemoryMarkerStore;
    use crate::routes::Route;
    use std::cell::RefCell;

    /// Provider returning a fixed answer per mode and recording calls.
    struct StubProvider {
        driving: fn() -> Result<RouteLookup>,
        walking: fn() -> Result<RouteLookup>,
        calls: RefCell<Vec<TravelMode>>,
    }

    impl DirectionsProvider for StubProvider {
        fn directions(
            &self,
            _origin: LatLon,
            _destination: LatLon,
            mode: TravelMode,
        ) -> Result<RouteLookup> {
            self.calls.borrow_mut().push(mode);
            match mode {
                TravelMode::Driving => (self.driving)(),
                TravelMode::Walking => (self.walking)(),
            }
        }
    }

    fn found() -> Result<RouteLookup> {
        Ok(RouteLookup::Found(Route {
            duration_text: "12 mins".to_string(),
            distance_text: "3.4 km".to_string(),
            duration_secs: Some(720),
            distance_meters: Some(3400),
            path: vec![LatLon::new(37.5, 127.0), LatLon::new(37.52, 127.03)],
        }))
    }

    fn no_route() -> Result<RouteLookup> {
        Ok(RouteLookup::NoRoute)
    }

    fn failing() -> Result<RouteLookup> {
        Err(Error::Provider("REQUEST_DENIED".to_string()))
    }

    fn stub(
        driving: fn() -> Result<RouteLookup>,
        walking: fn() -> Result<RouteLookup>,
    ) -> StubProvider {
        StubProvider {
            driving,
            walking,
            calls: RefCell::new(Vec::new()),
        }
    }

    #[test]
    fn test_plan_both_modes() {
        let planner = RoutePlanner::new(stub(found, no_route));
        let plan = planner
            .plan(
                LatLon::new(37.5, 127.0),
                LatLon::new(37.52, 127.03),
                ModeSelection::Both,
            )
            .unwrap();

        assert_eq!(plan.results.len(), 2);
        assert_eq!(plan.results[0].mode, TravelMode::Walking);
        assert!(matches!(
            plan.outcome(TravelMode::Walking),
            Some(RouteOutcome::NoRoute { .. })
        ));
        assert!(matches!(
            plan.outcome(TravelMode::Driving),
            Some(RouteOutcome::Found(_))
        ));
    }

    #[test]
    fn test_walking_limit_skips_provider() {
        let planner = RoutePlanner::new(stub(found, found));
        let seoul = LatLon::new(37.5665, 126.9780);
        let busan = LatLon::new(35.1796, 129.0756);

        let plan = planner.plan(seoul, busan, ModeSelection::Both).unwrap();

        assert!(matches!(
            plan.outcome(TravelMode::Walking),
            Some(RouteOutcome::LimitExceeded { limit_km, .. }) if *limit_km == 100.0
        ));
        assert!(matches!(
            plan.outcome(TravelMode::Driving),
            Some(RouteOutcome::Found(_))
        ));
        assert_eq!(*planner.provider.calls.borrow(), vec![TravelMode::Driving]);
    }

    #[test]
    fn test_provider_failure_is_per_mode() {
        let planner = RoutePlanner::new(stub(failing, found));
        let plan = planner
            .plan(
                LatLon::new(37.5, 127.0),
                LatLon::new(37.52, 127.03),
                ModeSelection::Both,
            )
            .unwrap();

        assert!(matches!(
            plan.outcome(TravelMode::Driving),
            Some(RouteOutcome::Unavailable { .. })
        ));
        assert!(matches!(
            plan.outcome(TravelMode::Walking),
            Some(RouteOutcome::Found(_))
        ));
    }

    #[test]
    fn test_plan_same_point_rejected() {
        let planner = RoutePlanner::new(stub(found, found));
        let p = LatLon::new(37.5, 127.0);
        assert!(matches!(
            planner.plan(p, p, ModeSelection::Driving),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_plan_between_markers() {
        let mut store = MemoryMarkerStore::new();
        store.append("Home", 37.5, 127.0).unwrap();
        store.append("Office", 37.52, 127.03).unwrap();

        let planner = RoutePlanner::new(stub(found, found)).with_walking_limit(1.0);
        let plan = planner
            .plan_between(&store, "Home", "Office", ModeSelection::Both)
            .unwrap();

        assert_eq!(plan.origin, LatLon::new(37.5, 127.0));
        assert!(matches!(
            plan.outcome(TravelMode::Walking),
            Some(RouteOutcome::LimitExceeded { .. })
        ));

        assert!(matches!(
            planner.plan_between(&store, "Home", "Gym", ModeSelection::Driving),
            Err(Error::MarkerNotFound(_))
        ));
        assert!(matches!(
            planner.plan_between(&store, "Home", "Home", ModeSelection::Driving),
            Err(Error::InvalidInput(_))
        ));
    }
}
