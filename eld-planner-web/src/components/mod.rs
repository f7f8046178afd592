pub mod footer;
pub mod location_search;
pub mod map_view;
