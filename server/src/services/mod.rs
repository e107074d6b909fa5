pub mod email_template;
pub mod intake;
pub mod notifier;
pub mod store;
pub mod validator;
