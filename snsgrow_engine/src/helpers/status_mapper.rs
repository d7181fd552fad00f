//! Provider status translation.
//!
//! The SMM panel reports free-form status strings (`"Pending"`, `"In progress"`, `"Partial"` and so on) together with
//! a `remains` counter. These functions are the only place where that vocabulary is interpreted. Everything
//! downstream (sync, tracking, admin views) works with [`OrderStatusType`] and the persisted progress value.
//!
//! Both functions are total: unknown inputs fall back to "still processing" rather than failing a sync.
use crate::db_types::OrderStatusType;

/// Progress never exceeds this value unless the provider reports the order as done.
pub const MAX_RUNNING_PROGRESS: u8 = 95;
/// Progress reported for a running order as soon as delivery has visibly started.
pub const MIN_RUNNING_PROGRESS: u8 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProviderPhase {
    Queued,
    Running,
    Done,
    Cancelled,
    Unknown,
}

fn phase(provider_status: &str) -> ProviderPhase {
    match provider_status.trim().to_lowercase().as_str() {
        "pending" | "in queue" => ProviderPhase::Queued,
        "in progress" | "processing" => ProviderPhase::Running,
        "completed" | "partial" => ProviderPhase::Done,
        "canceled" | "cancelled" => ProviderPhase::Cancelled,
        _ => ProviderPhase::Unknown,
    }
}

/// Maps a provider status string onto the local order state.
///
/// | provider                           | local        |
/// |------------------------------------|--------------|
/// | pending, in queue, in progress, processing | `processing` |
/// | completed, partial                 | `completed`  |
/// | canceled, cancelled                | `failed`     |
/// | anything else                      | `processing` |
///
/// A partially delivered order counts as completed, because the panel has refunded the undelivered remainder.
pub fn map_status(provider_status: &str) -> OrderStatusType {
    match phase(provider_status) {
        ProviderPhase::Done => OrderStatusType::Completed,
        ProviderPhase::Cancelled => OrderStatusType::Failed,
        ProviderPhase::Queued | ProviderPhase::Running | ProviderPhase::Unknown => OrderStatusType::Processing,
    }
}

/// Computes delivery progress in the range `[0, 100]` from the provider status and counters.
///
/// While running, progress is the delivered share of `quantity`, bounded to
/// `[MIN_RUNNING_PROGRESS, MAX_RUNNING_PROGRESS]`. Without usable counters (missing values or a non-positive
/// quantity) a running order is reported at 50%.
pub fn compute_progress(provider_status: &str, remains: Option<i64>, quantity: Option<i64>) -> u8 {
    match phase(provider_status) {
        ProviderPhase::Queued => 5,
        ProviderPhase::Running => match (remains, quantity) {
            (Some(remains), Some(quantity)) if quantity > 0 => {
                let delivered = quantity.saturating_sub(remains) as f64;
                let pct = (delivered / quantity as f64 * 100.0).round();
                pct.clamp(MIN_RUNNING_PROGRESS as f64, MAX_RUNNING_PROGRESS as f64) as u8
            },
            _ => 50,
        },
        ProviderPhase::Done => 100,
        ProviderPhase::Cancelled => 0,
        ProviderPhase::Unknown => MIN_RUNNING_PROGRESS,
    }
}

/// Combines a freshly computed progress value with the stored one so that progress never goes backwards.
///
/// * `completed` always yields 100.
/// * `failed` and `cancelled` take the fresh value unchanged (a reset).
/// * Anything else keeps the larger of the two values, capped at [`MAX_RUNNING_PROGRESS`].
pub fn clamp_progress(status: OrderStatusType, previous: i64, fresh: u8) -> i64 {
    match status {
        OrderStatusType::Completed => 100,
        OrderStatusType::Failed | OrderStatusType::Cancelled => i64::from(fresh),
        _ => i64::from(fresh).max(previous).min(i64::from(MAX_RUNNING_PROGRESS)),
    }
}
