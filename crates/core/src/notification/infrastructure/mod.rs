pub mod slack_notifier;
