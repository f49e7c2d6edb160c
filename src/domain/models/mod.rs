pub mod accommodation;
pub mod activity;
pub mod budget;
pub mod config;
pub mod dates;
pub mod destination;
pub mod flight;
pub mod interaction;
pub mod protection;
pub mod traveler;

pub use accommodation::{
    AccommodationDefaults, AccommodationEntry, AccommodationPatch, LodgingType,
};
pub use activity::{ActivityDefaults, ActivityEntry, ActivityPatch, ActivityType};
pub use budget::{BudgetPreset, BudgetRange};
pub use config::{
    Config, DatabaseConfig, InteractionConfig, LoggingConfig, PersistenceConfig,
};
pub use dates::DateRange;
pub use destination::{
    normalize_city, Coordinates, Destination, DestinationId, DestinationSource,
};
pub use flight::{Airport, FlightLeg, TripType};
pub use interaction::{
    InteractionType, WidgetInteraction, WidgetInteractionLog, WidgetType,
};
pub use protection::{FieldFamily, ProtectionFlags};
pub use traveler::TravelerGroup;
