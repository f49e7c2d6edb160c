//! Topology reconciler.
//!
//! When the trip type or leg count changes, the required destination set
//! changes with it: one destination for one-way and round-trip, one per
//! distinct non-origin city for multi-city. The reconciler diffs the required
//! set against current entries by normalized city, removes entries whose
//! destination vanished from the itinerary, and reports the destinations
//! that must exist so the engine can route them through the sync service's
//! propagation path (new entries then inherit defaults under the conflict
//! policy like any other auto write).
//!
//! Entries for surviving cities are left completely untouched, fields and
//! protection flags included, which is what makes "switch trip type and
//! switch back" lossless for a surviving city.
//!
//! Removal policy: a removed city's entry is discarded even when it carries
//! user-protected customizations. The itinerary is authoritative for which
//! destinations exist; archival for later restoration is deliberately not
//! attempted.

use std::collections::HashSet;

use crate::domain::models::destination::Destination;

use super::event_bus::SyncTarget;
use super::stores::{AccommodationStore, ActivityStore, FlightStore};
use super::sync_service::DestinationSyncService;

/// What one reconciliation pass did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcileReport {
    /// Cities whose entries were dropped from at least one store.
    pub removed: Vec<String>,
    /// Cities whose entries survived untouched.
    pub retained: Vec<String>,
}

/// A destination the new topology requires, with the stores still missing an
/// entry for it.
#[derive(Debug, Clone, PartialEq)]
pub struct RequiredAddition {
    pub destination: Destination,
    pub missing_from: Vec<SyncTarget>,
}

/// Stateless reconciliation pass over the destination-scoped stores.
pub struct TopologyReconciler;

impl TopologyReconciler {
    /// Remove entries for vanished destinations and return the newly
    /// required destinations per store. The caller routes additions through
    /// the sync service's propagation path so they follow the normal auto
    /// write rules; destinations already present in a store are never
    /// re-propagated into it.
    pub fn reconcile(
        flight: &FlightStore,
        sync: &DestinationSyncService,
        accommodation: &mut AccommodationStore,
        activity: &mut ActivityStore,
    ) -> (ReconcileReport, Vec<RequiredAddition>) {
        let required = flight.required_destinations(sync);
        let required_cities: HashSet<String> =
            required.iter().map(Destination::normalized_city).collect();

        let mut report = ReconcileReport::default();
        let mut removed: HashSet<String> = HashSet::new();
        let mut retained: HashSet<String> = HashSet::new();

        accommodation.update_batch(|entries| {
            entries
                .into_iter()
                .filter(|entry| {
                    let keep = required_cities.contains(&entry.normalized_city());
                    if keep {
                        retained.insert(entry.city.clone());
                    } else {
                        if entry.protection.any() {
                            tracing::info!(
                                city = %entry.city,
                                "discarding user-customized stay for removed destination"
                            );
                        }
                        removed.insert(entry.city.clone());
                    }
                    keep
                })
                .collect()
        });

        activity.update_batch(|entries| {
            entries
                .into_iter()
                .filter(|entry| {
                    let keep = required_cities.contains(&entry.normalized_city());
                    if keep {
                        retained.insert(entry.city.clone());
                    } else {
                        removed.insert(entry.city.clone());
                    }
                    keep
                })
                .collect()
        });

        report.removed = removed.into_iter().collect();
        report.removed.sort();
        report.retained = retained.into_iter().collect();
        report.retained.sort();

        let mut additions = Vec::new();
        for destination in required {
            let mut missing_from = Vec::new();
            if accommodation.by_city(&destination.city).is_none() {
                missing_from.push(SyncTarget::Accommodation);
            }
            if activity.by_city(&destination.city).is_none() {
                missing_from.push(SyncTarget::Activity);
            }
            if !missing_from.is_empty() {
                additions.push(RequiredAddition {
                    destination,
                    missing_from,
                });
            }
        }

        tracing::info!(
            removed = report.removed.len(),
            retained = report.retained.len(),
            additions = additions.len(),
            "topology reconciled"
        );

        (report, additions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::accommodation::AccommodationPatch;
    use crate::domain::models::budget::BudgetPreset;
    use crate::domain::models::flight::{Airport, FlightLeg, TripType};
    use crate::services::conflict_policy::WriteOrigin;

    fn leg(from: &str, to: &str) -> FlightLeg {
        FlightLeg::new(
            Airport::new("XXX", from, "US"),
            Airport::new("YYY", to, "US"),
        )
    }

    fn stores_for(
        trip_type: TripType,
        legs: &[(&str, &str)],
    ) -> (FlightStore, AccommodationStore, ActivityStore) {
        let mut flight = FlightStore::new(trip_type);
        for (from, to) in legs {
            flight.upsert_leg(leg(from, to));
        }
        (flight, AccommodationStore::default(), ActivityStore::default())
    }

    fn sync_all(
        flight: &FlightStore,
        sync: &DestinationSyncService,
        accommodation: &mut AccommodationStore,
        activity: &mut ActivityStore,
    ) {
        for destination in flight.required_destinations(sync) {
            accommodation.upsert_from_destination(&destination);
            activity.upsert_from_destination(&destination);
        }
    }

    #[test]
    fn test_multi_to_round_trip_keeps_one_entry() {
        let sync = DestinationSyncService::new();
        let (mut flight, mut accommodation, mut activity) = stores_for(
            TripType::MultiCity,
            &[("Boston", "Tokyo"), ("Tokyo", "Osaka"), ("Osaka", "Boston")],
        );
        sync_all(&flight, &sync, &mut accommodation, &mut activity);
        assert_eq!(accommodation.len(), 2);

        flight.set_trip_type(TripType::RoundTrip);
        let (report, additions) =
            TopologyReconciler::reconcile(&flight, &sync, &mut accommodation, &mut activity);

        assert_eq!(accommodation.len(), 1);
        assert_eq!(activity.len(), 1);
        assert!(additions.is_empty(), "surviving Tokyo needs no propagation");
        assert_eq!(report.removed, vec!["Osaka".to_string()]);
        assert_eq!(report.retained, vec!["Tokyo".to_string()]);
    }

    #[test]
    fn test_surviving_entry_keeps_fields_and_flags() {
        let sync = DestinationSyncService::new();
        let (mut flight, mut accommodation, mut activity) = stores_for(
            TripType::MultiCity,
            &[("Boston", "Tokyo"), ("Tokyo", "Osaka"), ("Osaka", "Boston")],
        );
        sync_all(&flight, &sync, &mut accommodation, &mut activity);

        let tokyo = accommodation.by_city("Tokyo").unwrap().id;
        accommodation
            .update(
                tokyo,
                AccommodationPatch::default().budget_preset(BudgetPreset::Luxury),
                WriteOrigin::Direct,
            )
            .unwrap();

        flight.set_trip_type(TripType::RoundTrip);
        TopologyReconciler::reconcile(&flight, &sync, &mut accommodation, &mut activity);

        let entry = accommodation.by_city("Tokyo").unwrap();
        assert_eq!(entry.budget_preset, BudgetPreset::Luxury);
        assert!(entry.protection.user_modified_budget);
    }

    #[test]
    fn test_protected_entry_for_removed_city_is_discarded() {
        let sync = DestinationSyncService::new();
        let (mut flight, mut accommodation, mut activity) = stores_for(
            TripType::MultiCity,
            &[("Boston", "Tokyo"), ("Tokyo", "Osaka"), ("Osaka", "Boston")],
        );
        sync_all(&flight, &sync, &mut accommodation, &mut activity);

        let osaka = accommodation.by_city("Osaka").unwrap().id;
        accommodation
            .update(
                osaka,
                AccommodationPatch::default().budget_preset(BudgetPreset::Premium),
                WriteOrigin::Direct,
            )
            .unwrap();

        flight.set_trip_type(TripType::RoundTrip);
        TopologyReconciler::reconcile(&flight, &sync, &mut accommodation, &mut activity);

        assert!(accommodation.by_city("Osaka").is_none());
    }

    #[test]
    fn test_one_way_to_multi_requires_both_cities() {
        let sync = DestinationSyncService::new();
        let (mut flight, mut accommodation, mut activity) = stores_for(
            TripType::OneWay,
            &[("Boston", "Tokyo"), ("Tokyo", "Osaka")],
        );
        sync_all(&flight, &sync, &mut accommodation, &mut activity);
        assert_eq!(accommodation.len(), 1, "one-way materializes only Tokyo");

        flight.set_trip_type(TripType::MultiCity);
        let (_, additions) =
            TopologyReconciler::reconcile(&flight, &sync, &mut accommodation, &mut activity);

        // Tokyo survives untouched; only Osaka needs propagation, into both
        // stores.
        assert_eq!(additions.len(), 1);
        assert_eq!(additions[0].destination.city, "Osaka");
        assert_eq!(additions[0].missing_from.len(), 2);
    }
}
