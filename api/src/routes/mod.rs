pub mod gitlab_webhook;
