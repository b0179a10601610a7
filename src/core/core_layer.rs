// The core module contains all business logic.
// Each feature gets its own submodule. Nothing in here knows about Discord or HTTP.

#[path = "anniversary/anniversary_calculator.rs"]
pub mod anniversary;

#[path = "credentials/credential_resolver.rs"]
pub mod credentials;

#[path = "homepage/homepage_service.rs"]
pub mod homepage;

#[path = "links/link_normalizer.rs"]
pub mod links;

#[path = "meals/choice_filter.rs"]
pub mod meals;

#[path = "records/mod.rs"]
pub mod records;

#[path = "travel_map/map_session.rs"]
pub mod travel_map;
