pub mod gitlab_webhook_route;
pub mod push_event_request;
