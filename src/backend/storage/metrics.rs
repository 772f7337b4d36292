// src/backend/storage/metrics.rs
use crate::metrics::AppMetrics;
use crate::storage::memory::{get_metrics_memory, Memory};
use ic_stable_structures::StableCell;
use std::cell::RefCell;

thread_local! {
    static METRICS: RefCell<StableCell<AppMetrics, Memory>> = RefCell::new(
        StableCell::init(get_metrics_memory(), AppMetrics::default())
            .expect("Failed to initialize metrics stable cell")
    );
}

pub fn get_metrics() -> AppMetrics {
    METRICS.with(|cell| cell.borrow().get().clone())
}

/// Applies `f` to the metrics value and writes it back. A failed write is
/// logged and dropped; metrics never fail a user operation.
pub fn update_metrics(f: impl FnOnce(&mut AppMetrics)) {
    METRICS.with(|cell| {
        let mut borrowed = cell.borrow_mut();
        let mut metrics = borrowed.get().clone();
        f(&mut metrics);
        if let Err(e) = borrowed.set(metrics) {
            ic_cdk::eprintln!("ERROR: Failed to persist metrics update: {:?}", e);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn updates_accumulate_in_the_cell() {
        update_metrics(|m| m.total_families += 1);
        update_metrics(|m| m.total_families += 1);
        update_metrics(|m| m.chores_approved_total += 3);
        let metrics = get_metrics();
        assert_eq!(metrics.total_families, 2);
        assert_eq!(metrics.chores_approved_total, 3);
    }
}
