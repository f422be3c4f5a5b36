pub mod agents_info_route;
