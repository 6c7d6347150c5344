use crate::util::parse_f64_safe;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};
use tabled::Tabled;

/// A raw form value. Wizard state arrives as JSON where the same field may
/// be a number, a numeric string, a boolean or an empty string depending on
/// which widget last touched it.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum FormField {
    Flag(bool),
    Number(f64),
    Text(String),
}

impl FormField {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FormField::Number(n) if n.is_finite() => Some(*n),
            FormField::Number(_) | FormField::Flag(_) => None,
            FormField::Text(s) => parse_f64_safe(Some(s.as_str())),
        }
    }

    pub fn as_flag(&self) -> bool {
        match self {
            FormField::Flag(b) => *b,
            FormField::Number(n) => *n != 0.0,
            FormField::Text(s) => matches!(
                s.trim().to_ascii_lowercase().as_str(),
                "true" | "yes" | "on" | "1"
            ),
        }
    }
}

impl From<f64> for FormField {
    fn from(v: f64) -> Self {
        FormField::Number(v)
    }
}

impl From<&str> for FormField {
    fn from(v: &str) -> Self {
        FormField::Text(v.to_string())
    }
}

impl From<bool> for FormField {
    fn from(v: bool) -> Self {
        FormField::Flag(v)
    }
}

/// Wizard form state as posted by the UI. Everything is optional; the
/// normalizer decides what a missing field means.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CalculatorInput {
    pub currency: Option<String>,
    pub market_level: Option<String>,
    pub origin_city: Option<String>,
    pub origin_state: Option<String>,
    pub destination_city: Option<String>,
    pub destination_state: Option<String>,
    pub event_start_date: Option<String>,
    pub event_end_date: Option<String>,
    pub arrival_date: Option<String>,
    pub departure_date: Option<String>,
    pub event_type: Option<String>,
    pub event_duration: Option<FormField>,
    pub venue_type: Option<String>,
    pub booth_size: Option<FormField>,
    pub custom_size: Option<FormField>,
    pub booth_type: Option<String>,
    pub team_size: Option<FormField>,
    pub accommodation_level: Option<String>,
    pub furniture: Option<FormField>,
    pub av_equipment: Option<FormField>,
    pub lighting: Option<FormField>,
    pub internet: Option<FormField>,
    pub storage: Option<FormField>,
    pub security: Option<FormField>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AddOnToggles {
    pub furniture: bool,
    pub av_equipment: bool,
    pub lighting: bool,
    pub internet: bool,
    pub storage: bool,
    pub security: bool,
}

/// Form state after the single coercion pass. Categorical keys stay as
/// trimmed strings; the rate resolver owns their interpretation.
#[derive(Debug, Clone, Default)]
pub struct NormalizedForm {
    pub currency: String,
    pub market_level: String,
    pub origin_city: String,
    pub origin_state: String,
    pub destination_city: String,
    pub destination_state: String,
    pub venue_type: String,
    pub booth_type: String,
    pub accommodation_level: String,
    pub area_sqm: f64,
    pub stay_days: f64,
    pub event_days: f64,
    pub team_size: f64,
    pub event_start: Option<NaiveDateTime>,
    pub add_ons: AddOnToggles,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    #[strum(serialize = "Booth space")]
    Space,
    #[strum(serialize = "Construction")]
    Construction,
    #[strum(serialize = "Utilities & services")]
    Utilities,
    #[strum(serialize = "Logistics")]
    Logistics,
    #[strum(serialize = "Travel")]
    Travel,
    #[strum(serialize = "Staff & operations")]
    StaffOps,
    #[strum(serialize = "Marketing")]
    Marketing,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaInput {
    pub value: f64,
    #[serde(default = "default_area_unit")]
    pub unit: String,
}

fn default_area_unit() -> String {
    "sqm".to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpaceInput {
    pub flat: Option<f64>,
    /// Per square meter.
    pub rate_per_unit_area: Option<f64>,
    pub location_premium_pct: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConstructionInput {
    pub flat: Option<f64>,
    /// Per square meter.
    pub rate_per_unit_area: Option<f64>,
    /// Missing or non-positive means 1.0.
    pub finish_factor: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddOnBasis {
    PerUnitArea,
    PerDay,
    Flat,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddOn {
    pub label: String,
    pub rate: f64,
    pub basis: AddOnBasis,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UtilitiesInput {
    pub power_kw: Option<f64>,
    pub power_rate: Option<f64>,
    pub internet: Option<f64>,
    pub furniture: Option<f64>,
    pub add_ons: Vec<AddOn>,
    /// Multiplier for `PerDay` add-ons.
    pub days: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogisticsInput {
    pub flat: Option<f64>,
    pub weight_kg: Option<f64>,
    pub rate_per_kg: Option<f64>,
    pub volume_cbm: Option<f64>,
    pub rate_per_cbm: Option<f64>,
    pub route_km: Option<f64>,
    pub rate_per_km: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TravelInput {
    pub team_count: Option<f64>,
    pub nights: Option<f64>,
    pub airfare_per_person: Option<f64>,
    pub hotel_nightly_rate: Option<f64>,
    pub local_transport_per_day: Option<f64>,
    pub meals_per_person_per_day: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StaffOpsInput {
    pub promoter_days: Option<f64>,
    pub promoter_rate: Option<f64>,
    pub uniforms_per_person: Option<f64>,
    pub team_count: Option<f64>,
    pub ops_misc_flat: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketingInput {
    pub print: Option<f64>,
    pub giveaways: Option<f64>,
    /// Only charged for booths above the digital-campaign threshold.
    pub digital: Option<f64>,
    pub av_production: Option<f64>,
    pub av_enabled: bool,
    /// Per square meter.
    pub other_rate: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxableFlags {
    pub space: bool,
    pub construction: bool,
    pub utilities: bool,
    pub logistics: bool,
    pub travel: bool,
    pub staff_ops: bool,
    pub marketing: bool,
}

impl Default for TaxableFlags {
    fn default() -> Self {
        Self {
            space: true,
            construction: true,
            utilities: true,
            logistics: true,
            travel: false,
            staff_ops: true,
            marketing: true,
        }
    }
}

impl TaxableFlags {
    pub fn none() -> Self {
        Self {
            space: false,
            construction: false,
            utilities: false,
            logistics: false,
            travel: false,
            staff_ops: false,
            marketing: false,
        }
    }

    pub fn is_taxable(&self, category: Category) -> bool {
        match category {
            Category::Space => self.space,
            Category::Construction => self.construction,
            Category::Utilities => self.utilities,
            Category::Logistics => self.logistics,
            Category::Travel => self.travel,
            Category::StaffOps => self.staff_ops,
            Category::Marketing => self.marketing,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxInput {
    /// `None` means the standard GST rate.
    pub rate_pct: Option<f64>,
    pub taxable_flags: TaxableFlags,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContingencyBase {
    #[default]
    PreTax,
    PostTax,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContingencyInput {
    /// `None` means the standard contingency rate.
    pub rate_pct: Option<f64>,
    pub base: ContingencyBase,
}

/// Fully expanded parameters for one calculation pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationInput {
    pub area: AreaInput,
    #[serde(default)]
    pub space: SpaceInput,
    #[serde(default)]
    pub construction: ConstructionInput,
    #[serde(default)]
    pub utilities: UtilitiesInput,
    #[serde(default)]
    pub logistics: LogisticsInput,
    #[serde(default)]
    pub travel: TravelInput,
    #[serde(default)]
    pub staff_ops: StaffOpsInput,
    #[serde(default)]
    pub marketing: MarketingInput,
    #[serde(default)]
    pub tax: TaxInput,
    #[serde(default)]
    pub contingency: ContingencyInput,
}

impl CalculationInput {
    /// An input with only the area set; every category contributes 0.
    pub fn with_area(value: f64, unit: &str) -> Self {
        Self {
            area: AreaInput {
                value,
                unit: unit.to_string(),
            },
            space: SpaceInput::default(),
            construction: ConstructionInput::default(),
            utilities: UtilitiesInput::default(),
            logistics: LogisticsInput::default(),
            travel: TravelInput::default(),
            staff_ops: StaffOpsInput::default(),
            marketing: MarketingInput::default(),
            tax: TaxInput::default(),
            contingency: ContingencyInput::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedArea {
    pub sqm: f64,
    pub sqft: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Breakdown {
    pub space: f64,
    pub construction: f64,
    pub utilities: f64,
    pub logistics: f64,
    pub travel: f64,
    pub staff_ops: f64,
    pub marketing: f64,
    pub subtotal: f64,
    pub tax_total: f64,
    pub contingency_total: f64,
}

impl Breakdown {
    pub fn amount(&self, category: Category) -> f64 {
        match category {
            Category::Space => self.space,
            Category::Construction => self.construction,
            Category::Utilities => self.utilities,
            Category::Logistics => self.logistics,
            Category::Travel => self.travel,
            Category::StaffOps => self.staff_ops,
            Category::Marketing => self.marketing,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    pub grand_total: f64,
    pub cost_per_sqm: f64,
    pub cost_per_sqft: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationResult {
    pub area: NormalizedArea,
    pub breakdown: Breakdown,
    pub totals: Totals,
    /// Copied from the input so exports can mark taxable lines.
    pub taxable_flags: TaxableFlags,
}

/// The record the wizard UI and quote generator consume. Amounts are whole
/// currency units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostBreakdown {
    pub booth_cost: u64,
    pub construction_cost: u64,
    pub travel_cost: u64,
    pub staff_cost: u64,
    pub marketing_cost: u64,
    pub logistics_cost: u64,
    pub services_cost: u64,
    pub total: u64,
    pub currency: String,
}

/// Higher-level estimate with the multiplier stage exposed for auditing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnhancedEstimate {
    pub result: CalculationResult,
    pub seasonal_multiplier: f64,
    pub team_multiplier: f64,
    pub adjusted_total: f64,
    pub breakdown: CostBreakdown,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct LineItemRow {
    #[serde(rename = "Item")]
    #[tabled(rename = "Item")]
    pub item: String,
    #[serde(rename = "Amount")]
    #[tabled(rename = "Amount")]
    pub amount: String,
    #[serde(rename = "Taxable")]
    #[tabled(rename = "Taxable")]
    pub taxable: String,
}

#[derive(Debug, Serialize)]
pub struct QuoteSummary {
    pub currency: String,
    pub area_sqm: f64,
    pub area_sqft: f64,
    pub subtotal: f64,
    pub tax_total: f64,
    pub contingency_total: f64,
    pub grand_total: f64,
    pub seasonal_multiplier: f64,
    pub team_multiplier: f64,
    pub adjusted_total: u64,
    pub cost_per_sqm: f64,
    pub cost_per_sqft: f64,
    pub breakdown: CostBreakdown,
}
