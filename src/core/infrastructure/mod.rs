pub mod api_client;
pub mod control_plane;
pub mod store;
