// src/backend/services/notification_service.rs
use crate::adapter::mail_adapter;
use crate::models::notification::NotificationEvent;

/// Dispatches a notification without awaiting it. A failed delivery is
/// logged and dropped; the operation that produced the event has already
/// succeeded and stays succeeded.
pub fn send(event: NotificationEvent) {
    ic_cdk::println!(
        "INFO: Queueing {} notification to {}",
        event.kind.as_str(),
        event.to
    );
    ic_cdk::spawn(async move {
        if let Err(e) = mail_adapter::deliver(&event).await {
            ic_cdk::eprintln!(
                "WARNING: Failed to deliver {} notification to {}: {}",
                event.kind.as_str(),
                event.to,
                e
            );
        }
    });
}
