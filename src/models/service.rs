use serde::{Deserialize, Serialize};

/// A catalog entry. Money fields are integer cents.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Service {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub unit: Option<String>,
    pub is_active: bool,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    pub hourly_rate: Option<i64>,
    pub base_fee: Option<i64>,
    pub materials_markup_percent: Option<f64>,
}

/// Fields accepted when creating or editing a service. Absent fields are left
/// alone on update and take catalog defaults on create.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceDraft {
    pub name: Option<String>,
    pub description: Option<String>,
    pub unit: Option<String>,
    pub is_active: Option<bool>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    pub hourly_rate: Option<i64>,
    pub base_fee: Option<i64>,
    pub materials_markup_percent: Option<f64>,
}
