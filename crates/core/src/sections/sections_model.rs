//! Section and risk-item domain models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ValidationError;
use crate::sections::sections_errors::SectionError;
use premia_rating::{CalculatedRiskItem, SectionPayload, StockItemPayload};

/// Stock sub-record carried by some risk items (e.g. a Stock section line
/// with its own rate and discount).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockItem {
    pub code: String,
    #[serde(default)]
    pub description: String,
    pub stock_sum_insured: Decimal,
    pub stock_rate: Decimal,
    #[serde(default)]
    pub stock_discount_rate: Decimal,
}

/// Premium figures for one risk item, either previewed locally or returned
/// by the rating service. Only server-returned values are authoritative.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputedPremium {
    pub actual_premium: Decimal,
    pub share_value: Decimal,
    pub premium_value: Decimal,
    #[serde(default)]
    pub stock_discount_amount: Decimal,
    #[serde(default)]
    pub fea_discount_amount: Decimal,
    pub net_premium_after_discounts: Decimal,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_premium_formula: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub premium_formula: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub net_premium_formula: Option<String>,
}

/// Input for creating a new risk item inside a section.
#[derive(Debug, Clone, Default)]
pub struct NewRiskItem {
    pub smi_code: String,
    pub description: String,
    pub location: String,
    pub actual_value: Decimal,
    pub item_rate: Decimal,
    /// Defaults to 1 when not captured.
    pub multiply_rate: Option<Decimal>,
    pub fea_discount_rate: Decimal,
    pub stock_item: Option<StockItem>,
}

/// Partial update of a risk item's rating inputs. `None` fields are left
/// unchanged; `stock_item` uses a nested Option so the sub-record can be
/// cleared explicitly.
#[derive(Debug, Clone, Default)]
pub struct RiskItemUpdate {
    pub smi_code: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub actual_value: Option<Decimal>,
    pub item_rate: Option<Decimal>,
    pub multiply_rate: Option<Decimal>,
    pub fea_discount_rate: Option<Decimal>,
    pub stock_item: Option<Option<StockItem>>,
}

/// One insurable line within a section.
///
/// `id` is the stable identity key used to reconcile rating responses with
/// local state; `item_no` is display position only and is renumbered when
/// items are removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskItem {
    pub id: Uuid,
    pub item_no: u32,
    pub section_id: String,
    pub smi_code: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    pub actual_value: Decimal,
    pub item_rate: Decimal,
    pub multiply_rate: Decimal,
    #[serde(default)]
    pub fea_discount_rate: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock_item: Option<StockItem>,

    /// Filled by the rating stage; empty until the item has been rated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub computed: Option<ComputedPremium>,
    /// True when a rating input changed after `computed` was filled. Stale
    /// figures are kept for display but are no longer authoritative.
    #[serde(default)]
    pub computed_stale: bool,
}

impl RiskItem {
    pub fn new(section_id: &str, item_no: u32, input: NewRiskItem) -> Self {
        RiskItem {
            id: Uuid::new_v4(),
            item_no,
            section_id: section_id.to_string(),
            smi_code: input.smi_code,
            description: input.description,
            location: input.location,
            actual_value: input.actual_value,
            item_rate: input.item_rate,
            multiply_rate: input.multiply_rate.unwrap_or(Decimal::ONE),
            fea_discount_rate: input.fea_discount_rate,
            stock_item: input.stock_item,
            computed: None,
            computed_stale: false,
        }
    }

    /// Applies a partial edit. Any change to a rating input marks the
    /// computed figures stale; a description edit alone does not.
    pub fn apply_update(&mut self, update: RiskItemUpdate) {
        let mut rating_input_changed = false;

        if let Some(smi_code) = update.smi_code {
            rating_input_changed |= smi_code != self.smi_code;
            self.smi_code = smi_code;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(location) = update.location {
            rating_input_changed |= location != self.location;
            self.location = location;
        }
        if let Some(actual_value) = update.actual_value {
            rating_input_changed |= actual_value != self.actual_value;
            self.actual_value = actual_value;
        }
        if let Some(item_rate) = update.item_rate {
            rating_input_changed |= item_rate != self.item_rate;
            self.item_rate = item_rate;
        }
        if let Some(multiply_rate) = update.multiply_rate {
            rating_input_changed |= multiply_rate != self.multiply_rate;
            self.multiply_rate = multiply_rate;
        }
        if let Some(fea_discount_rate) = update.fea_discount_rate {
            rating_input_changed |= fea_discount_rate != self.fea_discount_rate;
            self.fea_discount_rate = fea_discount_rate;
        }
        if let Some(stock_item) = update.stock_item {
            rating_input_changed |= stock_item != self.stock_item;
            self.stock_item = stock_item;
        }

        if rating_input_changed && self.computed.is_some() {
            self.computed_stale = true;
        }
    }

    /// Maps this item to the wire shape. Computed fields already returned
    /// by the rating service are carried verbatim; unrated items go out
    /// with computed fields at zero for the service to fill.
    pub fn to_payload(&self) -> CalculatedRiskItem {
        let computed = self.computed.clone().unwrap_or_default();
        CalculatedRiskItem {
            item_id: self.id,
            item_no: self.item_no,
            section_id: self.section_id.clone(),
            smi_code: self.smi_code.clone(),
            description: self.description.clone(),
            location: self.location.clone(),
            actual_value: self.actual_value,
            item_rate: self.item_rate,
            multiply_rate: self.multiply_rate,
            fea_discount_rate: self.fea_discount_rate,
            stock_item: self.stock_item.clone().map(Into::into),
            actual_premium: computed.actual_premium,
            share_value: computed.share_value,
            premium_value: computed.premium_value,
            stock_discount_amount: computed.stock_discount_amount,
            fea_discount_amount: computed.fea_discount_amount,
            net_premium_after_discounts: computed.net_premium_after_discounts,
            actual_premium_formula: computed.actual_premium_formula,
            premium_formula: computed.premium_formula,
            net_premium_formula: computed.net_premium_formula,
        }
    }
}

impl From<StockItem> for StockItemPayload {
    fn from(stock: StockItem) -> Self {
        StockItemPayload {
            code: stock.code,
            description: stock.description,
            stock_sum_insured: stock.stock_sum_insured,
            stock_rate: stock.stock_rate,
            stock_discount_rate: stock.stock_discount_rate,
        }
    }
}

impl From<StockItemPayload> for StockItem {
    fn from(payload: StockItemPayload) -> Self {
        StockItem {
            code: payload.code,
            description: payload.description,
            stock_sum_insured: payload.stock_sum_insured,
            stock_rate: payload.stock_rate,
            stock_discount_rate: payload.stock_discount_rate,
        }
    }
}

/// Named grouping of risk items sharing a location.
///
/// The aggregate fields are derived: they are either recomputed locally
/// from `risk_items` or overwritten by the most recent server response.
/// `last_calculated` decides which of two snapshots of the same section
/// is the fresher one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub risk_items: Vec<RiskItem>,

    #[serde(default)]
    pub section_sum_insured: Decimal,
    #[serde(default)]
    pub section_premium: Decimal,
    #[serde(default)]
    pub section_net_premium: Decimal,
    #[serde(default = "default_proportion_rate")]
    pub proportion_rate: Decimal,

    #[serde(default)]
    pub last_calculated: Option<DateTime<Utc>>,
}

fn default_proportion_rate() -> Decimal {
    dec!(100)
}

impl Section {
    /// Creates a section with a generated stable id. The name may be free
    /// text outside the catalogue, but must not be empty.
    pub fn new(name: &str, location: &str) -> Result<Self, ValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::MissingField("sectionName".to_string()));
        }
        if !crate::constants::is_catalogue_section_name(name) {
            log::debug!("Section name '{}' is outside the standard catalogue", name);
        }

        Ok(Section {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            location: location.to_string(),
            risk_items: Vec::new(),
            section_sum_insured: Decimal::ZERO,
            section_premium: Decimal::ZERO,
            section_net_premium: Decimal::ZERO,
            proportion_rate: default_proportion_rate(),
            last_calculated: None,
        })
    }

    /// Appends a new risk item, numbered after the existing ones, and
    /// returns its generated id.
    pub fn add_item(&mut self, input: NewRiskItem) -> Uuid {
        let item_no = self.risk_items.len() as u32 + 1;
        let item = RiskItem::new(&self.id, item_no, input);
        let item_id = item.id;
        self.risk_items.push(item);
        item_id
    }

    /// Removes a risk item by id and renumbers the remaining items so
    /// their `item_no` values are again `1..n` in order.
    pub fn remove_item(&mut self, item_id: Uuid) -> Result<(), SectionError> {
        let position = self
            .risk_items
            .iter()
            .position(|item| item.id == item_id)
            .ok_or(SectionError::ItemNotFound {
                section_id: self.id.clone(),
                item_id,
            })?;

        self.risk_items.remove(position);
        self.renumber_items();
        Ok(())
    }

    /// Reassigns sequential `item_no` values in current order.
    pub fn renumber_items(&mut self) {
        for (index, item) in self.risk_items.iter_mut().enumerate() {
            item.item_no = index as u32 + 1;
        }
    }

    pub fn item(&self, item_id: Uuid) -> Option<&RiskItem> {
        self.risk_items.iter().find(|item| item.id == item_id)
    }

    pub fn item_mut(&mut self, item_id: Uuid) -> Option<&mut RiskItem> {
        self.risk_items.iter_mut().find(|item| item.id == item_id)
    }

    /// Sum insured across all items, recomputed from the item inputs.
    pub fn local_sum_insured(&self) -> Decimal {
        self.risk_items
            .iter()
            .map(|item| item.actual_value)
            .sum::<Decimal>()
    }

    /// Net premium across all rated items. Unrated items contribute zero;
    /// this is the local fallback view, not an authoritative aggregate.
    pub fn local_net_premium(&self) -> Decimal {
        self.risk_items
            .iter()
            .filter_map(|item| item.computed.as_ref())
            .map(|computed| computed.net_premium_after_discounts)
            .sum::<Decimal>()
    }

    /// Maps this section and all of its items (including any without a
    /// stock sub-record) to the aggregate payload shape.
    pub fn to_payload(&self, proportion_rate: Decimal) -> SectionPayload {
        SectionPayload {
            section_id: self.id.clone(),
            section_name: self.name.clone(),
            location: self.location.clone(),
            proportion_rate,
            risk_items: self.risk_items.iter().map(RiskItem::to_payload).collect(),
        }
    }
}
