use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use super::domain::{FlatType, UnitId};

/// Stock of one flat type inside a project.
///
/// `available + outstanding.len() + withheld == total` holds after every operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct TypeStock {
    total: u32,
    available: u32,
    outstanding: BTreeSet<UnitId>,
    /// Units recorded as taken without a booking to account for them.
    withheld: u32,
}

impl TypeStock {
    fn with_total(total: u32) -> Self {
        Self {
            total,
            available: total,
            outstanding: BTreeSet::new(),
            withheld: 0,
        }
    }

    fn next_unit_id(&self, flat_type: FlatType) -> UnitId {
        let mut serial: u32 = 1;
        loop {
            let candidate = UnitId(format!("{}-{serial:03}", flat_type.unit_prefix()));
            if !self.outstanding.contains(&candidate) {
                return candidate;
            }
            serial += 1;
        }
    }
}

/// Why an inventory mutation was refused. Callers translate this into an allocation error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InventoryError {
    #[error("no {} units left", .0.label())]
    SoldOut(FlatType),
    #[error("unit {0} is not reserved")]
    UnknownUnit(UnitId),
    #[error("unit {0} is already reserved")]
    DuplicateUnit(UnitId),
}

/// Per-project flat inventory keyed by flat type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlatInventory {
    stock: BTreeMap<FlatType, TypeStock>,
}

impl FlatInventory {
    pub fn new(totals: impl IntoIterator<Item = (FlatType, u32)>) -> Self {
        let mut stock: BTreeMap<FlatType, TypeStock> = FlatType::ordered()
            .into_iter()
            .map(|flat_type| (flat_type, TypeStock::default()))
            .collect();
        for (flat_type, total) in totals {
            stock.insert(flat_type, TypeStock::with_total(total));
        }
        Self { stock }
    }

    pub fn total(&self, flat_type: FlatType) -> u32 {
        self.stock.get(&flat_type).map_or(0, |stock| stock.total)
    }

    pub fn available(&self, flat_type: FlatType) -> u32 {
        self.stock.get(&flat_type).map_or(0, |stock| stock.available)
    }

    pub fn outstanding(&self, flat_type: FlatType) -> impl Iterator<Item = &UnitId> {
        self.stock
            .get(&flat_type)
            .into_iter()
            .flat_map(|stock| stock.outstanding.iter())
    }

    pub fn withheld(&self, flat_type: FlatType) -> u32 {
        self.stock.get(&flat_type).map_or(0, |stock| stock.withheld)
    }

    pub fn has_available(&self, flat_type: FlatType) -> bool {
        self.available(flat_type) > 0
    }

    /// Take one unit of `flat_type`, leaving the inventory untouched when none is left.
    pub fn reserve(&mut self, flat_type: FlatType) -> Result<UnitId, InventoryError> {
        let stock = self
            .stock
            .get_mut(&flat_type)
            .filter(|stock| stock.available > 0)
            .ok_or(InventoryError::SoldOut(flat_type))?;

        let unit_id = stock.next_unit_id(flat_type);
        stock.available -= 1;
        stock.outstanding.insert(unit_id.clone());
        Ok(unit_id)
    }

    /// Return a reserved unit, yielding the flat type it belonged to.
    pub fn release(&mut self, unit_id: &UnitId) -> Result<FlatType, InventoryError> {
        let (flat_type, stock) = self
            .stock
            .iter_mut()
            .find(|(_, stock)| stock.outstanding.contains(unit_id))
            .ok_or_else(|| InventoryError::UnknownUnit(unit_id.clone()))?;

        stock.outstanding.remove(unit_id);
        stock.available += 1;
        Ok(*flat_type)
    }

    /// Re-attach a reservation recorded before the process started.
    pub fn adopt(&mut self, flat_type: FlatType, unit_id: UnitId) -> Result<(), InventoryError> {
        if self
            .stock
            .values()
            .any(|stock| stock.outstanding.contains(&unit_id))
        {
            return Err(InventoryError::DuplicateUnit(unit_id));
        }

        let stock = self
            .stock
            .get_mut(&flat_type)
            .filter(|stock| stock.available > 0)
            .ok_or(InventoryError::SoldOut(flat_type))?;
        stock.available -= 1;
        stock.outstanding.insert(unit_id);
        Ok(())
    }

    /// Take up to `count` available units off sale without assigning unit ids.
    ///
    /// Returns how many were actually withheld.
    pub fn withhold(&mut self, flat_type: FlatType, count: u32) -> u32 {
        let Some(stock) = self.stock.get_mut(&flat_type) else {
            return 0;
        };
        let taken = count.min(stock.available);
        stock.available -= taken;
        stock.withheld += taken;
        taken
    }

    pub fn summary(&self) -> Vec<InventoryLine> {
        FlatType::ordered()
            .into_iter()
            .map(|flat_type| InventoryLine {
                flat_type,
                flat_type_label: flat_type.label(),
                total: self.total(flat_type),
                available: self.available(flat_type),
            })
            .collect()
    }
}

/// Read-only view of one flat type's counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InventoryLine {
    pub flat_type: FlatType,
    pub flat_type_label: &'static str,
    pub total: u32,
    pub available: u32,
}
