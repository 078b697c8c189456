pub mod notification_channel;
pub mod notification_dispatcher;
