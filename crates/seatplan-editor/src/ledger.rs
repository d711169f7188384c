use std::fmt;

use serde::{Deserialize, Serialize};

use seatplan_core::AreaId;

/// One seat picked for purchase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatSelection {
    pub area_id: AreaId,
    pub seat_number: u32,
    pub area_name: String,
    pub price: f64,
}

type Observer = Box<dyn FnMut(&[SeatSelection], f64) + Send>;

/// The seats one buyer has currently picked, keyed by `(area, seat number)`.
///
/// Entries keep pick order. The observer, if any, is called with the full
/// list and running total after every change, and only then.
#[derive(Default)]
pub struct SeatSelectionLedger {
    entries: Vec<SeatSelection>,
    observer: Option<Observer>,
}

impl SeatSelectionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the "selections changed" callback, replacing any previous one.
    pub fn on_selection_changed(&mut self, observer: impl FnMut(&[SeatSelection], f64) + Send + 'static) {
        self.observer = Some(Box::new(observer));
    }

    /// Remove the seat if present, otherwise add it. Returns whether the seat
    /// is selected afterwards.
    pub fn toggle(&mut self, area_id: &AreaId, seat_number: u32, area_name: &str, price: f64) -> bool {
        if let Some(i) = self.position(area_id, seat_number) {
            self.entries.remove(i);
            self.notify();
            return false;
        }
        self.entries.push(SeatSelection {
            area_id: area_id.clone(),
            seat_number,
            area_name: area_name.to_string(),
            price,
        });
        self.notify();
        true
    }

    /// Remove one seat. No-op when absent.
    pub fn remove(&mut self, area_id: &AreaId, seat_number: u32) -> bool {
        match self.position(area_id, seat_number) {
            Some(i) => {
                self.entries.remove(i);
                self.notify();
                true
            }
            None => false,
        }
    }

    /// Release every seat of an area. Returns how many were dropped.
    pub fn remove_area(&mut self, area_id: &AreaId) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| &e.area_id != area_id);
        let dropped = before - self.entries.len();
        if dropped > 0 {
            log::debug!("Released {} seats of deleted area {}", dropped, area_id);
            self.notify();
        }
        dropped
    }

    pub fn clear(&mut self) {
        if !self.entries.is_empty() {
            self.entries.clear();
            self.notify();
        }
    }

    pub fn contains(&self, area_id: &AreaId, seat_number: u32) -> bool {
        self.position(area_id, seat_number).is_some()
    }

    pub fn total(&self) -> f64 {
        self.entries.iter().map(|e| e.price).sum()
    }

    pub fn entries(&self) -> &[SeatSelection] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, area_id: &AreaId, seat_number: u32) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| &e.area_id == area_id && e.seat_number == seat_number)
    }

    fn notify(&mut self) {
        let total = self.total();
        if let Some(observer) = self.observer.as_mut() {
            observer(&self.entries, total);
        }
    }
}

impl fmt::Debug for SeatSelectionLedger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeatSelectionLedger")
            .field("entries", &self.entries)
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_scenario_c_toggle_twice() {
        let vip = AreaId::from("VIP");
        let mut ledger = SeatSelectionLedger::new();

        assert!(ledger.toggle(&vip, 12, "VIP", 50.0));
        assert_eq!(ledger.entries().len(), 1);
        assert_eq!(ledger.entries()[0].area_id, vip);
        assert_eq!(ledger.entries()[0].seat_number, 12);
        assert_eq!(ledger.entries()[0].price, 50.0);
        assert_eq!(ledger.total(), 50.0);

        assert!(!ledger.toggle(&vip, 12, "VIP", 50.0));
        assert!(ledger.is_empty());
        assert_eq!(ledger.total(), 0.0);
    }

    #[test]
    fn test_same_number_in_different_areas() {
        let mut ledger = SeatSelectionLedger::new();
        ledger.toggle(&AreaId::from("a"), 1, "A", 10.0);
        ledger.toggle(&AreaId::from("b"), 1, "B", 15.0);
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.total(), 25.0);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let a = AreaId::from("a");
        let mut ledger = SeatSelectionLedger::new();
        ledger.toggle(&a, 3, "A", 10.0);
        assert!(ledger.remove(&a, 3));
        assert!(!ledger.remove(&a, 3));
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_observer_sees_every_change() {
        let seen: Arc<Mutex<Vec<(usize, f64)>>> = Arc::default();
        let sink = Arc::clone(&seen);
        let a = AreaId::from("a");
        let b = AreaId::from("b");

        let mut ledger = SeatSelectionLedger::new();
        ledger.on_selection_changed(move |entries, total| {
            sink.lock().unwrap().push((entries.len(), total));
        });
        ledger.toggle(&a, 1, "A", 10.0);
        ledger.toggle(&b, 2, "B", 5.0);
        ledger.remove(&a, 99);
        ledger.remove_area(&a);
        ledger.remove_area(&a);
        ledger.clear();

        assert_eq!(
            *seen.lock().unwrap(),
            vec![(1, 10.0), (2, 15.0), (1, 5.0), (0, 0.0)]
        );
    }
}
