pub mod app_config;
pub mod drive;
pub mod routing_client;
pub mod submission_repo;
pub mod webhook_client;

pub use drive::DriveClient;
pub use routing_client::RoutingClient;
pub use submission_repo::RedisClient;
pub use webhook_client::WebhookClient;
