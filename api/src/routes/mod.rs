pub mod agents;
pub mod generate;
pub mod health;
pub mod root_route;
