//! Rate tables and the rate resolver.
//!
//! Every categorical key is a closed enum. A key that does not parse, or that
//! parses but is absent from a (possibly user-supplied) table, resolves to the
//! table's default key and logs a warning instead of failing the estimate.
use crate::error::EstimateError;
use crate::types::{ContingencyBase, NormalizedForm, TaxableFlags};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;
use strum::{Display, EnumIter, EnumString};
use tracing::{debug, warn};

/// ISO 3166-2 country prefix for Indian state codes (`IN-MH`, `IN-KA`, ...).
pub const DOMESTIC_STATE_PREFIX: &str = "IN";
pub const DOMESTIC_CURRENCY: &str = "INR";

/// Built-in rate card, shared read-only by every calculation.
pub static DEFAULT_RATES: Lazy<RateTables> = Lazy::new(RateTables::default);

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display,
    EnumString, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum City {
    #[strum(to_string = "mumbai", serialize = "bombay", serialize = "navi_mumbai")]
    Mumbai,
    #[strum(to_string = "delhi", serialize = "new_delhi", serialize = "ncr")]
    Delhi,
    #[strum(to_string = "bangalore", serialize = "bengaluru")]
    Bangalore,
    Hyderabad,
    #[strum(to_string = "chennai", serialize = "madras")]
    Chennai,
    #[strum(to_string = "kolkata", serialize = "calcutta")]
    Kolkata,
    Pune,
    Ahmedabad,
    #[strum(to_string = "goa", serialize = "panaji")]
    Goa,
    Jaipur,
    #[strum(to_string = "kochi", serialize = "cochin")]
    Kochi,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display,
    EnumString, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum BoothType {
    #[strum(to_string = "shell_scheme", serialize = "shell", serialize = "basic")]
    ShellScheme,
    #[strum(to_string = "modular", serialize = "standard")]
    Modular,
    #[strum(to_string = "custom", serialize = "custom_built")]
    Custom,
    #[strum(to_string = "premium", serialize = "luxury")]
    Premium,
}

impl BoothType {
    /// Finish multiplier on top of the per-area construction rate.
    pub fn finish_factor(self) -> f64 {
        match self {
            BoothType::Premium => 1.2,
            BoothType::Custom => 1.1,
            BoothType::ShellScheme | BoothType::Modular => 1.0,
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display,
    EnumString, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum VenueType {
    #[strum(
        to_string = "exhibition_centre",
        serialize = "exhibition_center",
        serialize = "exhibition_ground"
    )]
    ExhibitionCentre,
    #[strum(to_string = "convention_centre", serialize = "convention_center")]
    ConventionCentre,
    #[strum(to_string = "hotel", serialize = "hotel_ballroom")]
    Hotel,
    #[strum(to_string = "trade_centre", serialize = "trade_center")]
    TradeCentre,
    #[strum(to_string = "outdoor", serialize = "open_ground")]
    Outdoor,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display,
    EnumString, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum AccommodationTier {
    #[strum(to_string = "budget", serialize = "economy", serialize = "basic")]
    Budget,
    #[strum(to_string = "business", serialize = "standard", serialize = "mid_range")]
    Business,
    #[strum(to_string = "luxury", serialize = "premium", serialize = "five_star")]
    Luxury,
}

impl AccommodationTier {
    /// Luxury stays imply business-class air travel, business stays imply
    /// premium economy.
    pub fn air_class_multiplier(self) -> f64 {
        match self {
            AccommodationTier::Luxury => 3.2,
            AccommodationTier::Business => 1.4,
            AccommodationTier::Budget => 1.0,
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display,
    EnumString, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum MarketLevel {
    #[strum(to_string = "domestic", serialize = "india", serialize = "national")]
    Domestic,
    Low,
    Medium,
    High,
    Premium,
}

impl MarketLevel {
    /// Scales the international space rate when no city table applies.
    pub fn international_factor(self) -> f64 {
        match self {
            MarketLevel::Low => 0.8,
            MarketLevel::Domestic | MarketLevel::Medium => 1.0,
            MarketLevel::High => 1.25,
            MarketLevel::Premium => 1.5,
        }
    }
}

/// Parse a free-text form key into a closed enum. Spaces and hyphens are
/// folded to underscores so "New Delhi" and "new-delhi" both hit `new_delhi`.
pub fn parse_key<T: FromStr>(raw: &str) -> Option<T> {
    let key: String = raw
        .trim()
        .chars()
        .map(|c| if c == ' ' || c == '-' { '_' } else { c })
        .collect();
    if key.is_empty() {
        return None;
    }
    key.parse::<T>().ok()
}

pub fn is_domestic_state(code: &str) -> bool {
    let code = code.trim().to_ascii_uppercase();
    code == DOMESTIC_STATE_PREFIX || code.starts_with(&format!("{}-", DOMESTIC_STATE_PREFIX))
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HotelRates {
    pub luxury: f64,
    pub business: f64,
    pub budget: f64,
}

impl HotelRates {
    pub fn for_tier(&self, tier: AccommodationTier) -> f64 {
        match tier {
            AccommodationTier::Luxury => self.luxury,
            AccommodationTier::Business => self.business,
            AccommodationTier::Budget => self.budget,
        }
    }
}

/// A value attached to an unordered city pair (fare, distance).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CityPairRate {
    pub from: City,
    pub to: City,
    pub value: f64,
}

fn pair(from: City, to: City, value: f64) -> CityPairRate {
    CityPairRate { from, to, value }
}

/// Ordered pair first, then the reverse.
fn pair_lookup(table: &[CityPairRate], from: City, to: City) -> Option<f64> {
    table
        .iter()
        .find(|p| p.from == from && p.to == to)
        .or_else(|| table.iter().find(|p| p.from == to && p.to == from))
        .map(|p| p.value)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistanceBands {
    pub same_city_km: f64,
    pub same_state_km: f64,
    pub inter_state_km: f64,
    pub international_km: f64,
    pub fallback_km: f64,
}

/// Fixed unit rates for utilities, logistics, staff and marketing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnitRates {
    pub local_transport_per_day: f64,
    pub meals_per_person_per_day: f64,
    pub power_kw_per_sqm: f64,
    pub power_rate_per_kw: f64,
    pub internet_per_day: f64,
    pub furniture_per_sqm: f64,
    pub av_per_day: f64,
    pub lighting_per_sqm: f64,
    pub storage_per_day: f64,
    pub security_per_day: f64,
    pub material_kg_per_sqm: f64,
    pub freight_per_kg: f64,
    pub freight_per_cbm: f64,
    pub freight_per_km: f64,
    pub promoter_per_day: f64,
    pub uniform_per_person: f64,
    pub ops_misc_flat: f64,
    pub print: f64,
    pub giveaways: f64,
    pub digital: f64,
    pub av_production: f64,
    pub marketing_other_per_sqm: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InternationalRates {
    pub space_per_sqm: f64,
    pub construction_per_sqm: f64,
    pub flight_fare: f64,
    pub hotel: HotelRates,
    pub unit_rates: UnitRates,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TaxPolicy {
    pub gst_pct: f64,
    pub taxable_flags: TaxableFlags,
    pub contingency_pct: f64,
    pub contingency_base: ContingencyBase,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateTables {
    pub default_city: City,
    pub space_per_sqm: BTreeMap<City, f64>,
    pub default_booth_type: BoothType,
    pub construction_per_sqm: BTreeMap<BoothType, f64>,
    pub default_venue_type: VenueType,
    pub venue_premium_pct: BTreeMap<VenueType, f64>,
    pub flights: Vec<CityPairRate>,
    pub domestic_flight_fare: f64,
    pub default_accommodation: AccommodationTier,
    pub hotels: BTreeMap<City, HotelRates>,
    pub route_distances_km: Vec<CityPairRate>,
    pub distance_bands: DistanceBands,
    pub unit_rates: UnitRates,
    pub international: InternationalRates,
    pub policy: TaxPolicy,
}

impl RateTables {
    /// Load a full rate card from a JSON file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, EstimateError> {
        let s = std::fs::read_to_string(path)?;
        let tables: RateTables = serde_json::from_str(&s)?;
        Ok(tables)
    }
}

impl Default for RateTables {
    fn default() -> Self {
        use City::*;
        let space_per_sqm = BTreeMap::from([
            (Mumbai, 4200.0),
            (Delhi, 4000.0),
            (Bangalore, 3800.0),
            (Hyderabad, 3400.0),
            (Goa, 3500.0),
            (Chennai, 3200.0),
            (Pune, 3100.0),
            (Kolkata, 3000.0),
            (Ahmedabad, 2800.0),
            (Jaipur, 2600.0),
            (Kochi, 2500.0),
        ]);
        let construction_per_sqm = BTreeMap::from([
            (BoothType::ShellScheme, 2500.0),
            (BoothType::Modular, 6500.0),
            (BoothType::Custom, 12000.0),
            (BoothType::Premium, 15000.0),
        ]);
        let venue_premium_pct = BTreeMap::from([
            (VenueType::ExhibitionCentre, 0.0),
            (VenueType::ConventionCentre, 10.0),
            (VenueType::Hotel, 15.0),
            (VenueType::TradeCentre, 5.0),
            (VenueType::Outdoor, 0.0),
        ]);
        let flights = vec![
            pair(Delhi, Mumbai, 4500.0),
            pair(Mumbai, Bangalore, 4000.0),
            pair(Delhi, Bangalore, 5500.0),
            pair(Delhi, Chennai, 5800.0),
            pair(Mumbai, Chennai, 4200.0),
            pair(Delhi, Kolkata, 5000.0),
            pair(Mumbai, Hyderabad, 3800.0),
            pair(Delhi, Hyderabad, 5200.0),
            pair(Bangalore, Chennai, 3000.0),
            pair(Mumbai, Goa, 3500.0),
            pair(Delhi, Goa, 6000.0),
            pair(Mumbai, Kolkata, 5800.0),
            pair(Mumbai, Ahmedabad, 3200.0),
            pair(Delhi, Jaipur, 3000.0),
            pair(Bangalore, Kochi, 3200.0),
        ];
        let hotel = |luxury, business, budget| HotelRates {
            luxury,
            business,
            budget,
        };
        let hotels = BTreeMap::from([
            (Mumbai, hotel(18000.0, 9500.0, 4500.0)),
            (Delhi, hotel(16000.0, 8500.0, 4000.0)),
            (Bangalore, hotel(14000.0, 8000.0, 3800.0)),
            (Hyderabad, hotel(12000.0, 7000.0, 3200.0)),
            (Chennai, hotel(12000.0, 7000.0, 3200.0)),
            (Kolkata, hotel(11000.0, 6500.0, 3000.0)),
            (Pune, hotel(11000.0, 6500.0, 3000.0)),
            (Goa, hotel(15000.0, 8000.0, 3500.0)),
            (Ahmedabad, hotel(10000.0, 6000.0, 2800.0)),
            (Jaipur, hotel(12000.0, 6500.0, 2800.0)),
            (Kochi, hotel(10000.0, 6000.0, 2800.0)),
        ]);
        let route_distances_km = vec![
            pair(Mumbai, Pune, 150.0),
            pair(Delhi, Mumbai, 1400.0),
            pair(Mumbai, Bangalore, 980.0),
            pair(Delhi, Bangalore, 2150.0),
            pair(Mumbai, Ahmedabad, 530.0),
            pair(Bangalore, Chennai, 350.0),
            pair(Delhi, Kolkata, 1500.0),
            pair(Mumbai, Goa, 590.0),
            pair(Delhi, Jaipur, 280.0),
            pair(Mumbai, Hyderabad, 710.0),
        ];
        RateTables {
            default_city: Mumbai,
            space_per_sqm,
            default_booth_type: BoothType::Modular,
            construction_per_sqm,
            default_venue_type: VenueType::ExhibitionCentre,
            venue_premium_pct,
            flights,
            domestic_flight_fare: 5000.0,
            default_accommodation: AccommodationTier::Business,
            hotels,
            route_distances_km,
            distance_bands: DistanceBands {
                same_city_km: 25.0,
                same_state_km: 250.0,
                inter_state_km: 1200.0,
                international_km: 5000.0,
                fallback_km: 2000.0,
            },
            unit_rates: UnitRates {
                local_transport_per_day: 2000.0,
                meals_per_person_per_day: 1500.0,
                power_kw_per_sqm: 0.15,
                power_rate_per_kw: 1500.0,
                internet_per_day: 2500.0,
                furniture_per_sqm: 800.0,
                av_per_day: 15000.0,
                lighting_per_sqm: 600.0,
                storage_per_day: 2000.0,
                security_per_day: 3000.0,
                material_kg_per_sqm: 25.0,
                freight_per_kg: 12.0,
                freight_per_cbm: 0.0,
                freight_per_km: 35.0,
                promoter_per_day: 3500.0,
                uniform_per_person: 1200.0,
                ops_misc_flat: 15000.0,
                print: 15000.0,
                giveaways: 20000.0,
                digital: 25000.0,
                av_production: 30000.0,
                marketing_other_per_sqm: 200.0,
            },
            international: InternationalRates {
                space_per_sqm: 350.0,
                construction_per_sqm: 450.0,
                flight_fare: 45000.0,
                hotel: hotel(250.0, 200.0, 120.0),
                unit_rates: UnitRates {
                    local_transport_per_day: 60.0,
                    meals_per_person_per_day: 50.0,
                    power_kw_per_sqm: 0.15,
                    power_rate_per_kw: 25.0,
                    internet_per_day: 60.0,
                    furniture_per_sqm: 12.0,
                    av_per_day: 250.0,
                    lighting_per_sqm: 10.0,
                    storage_per_day: 40.0,
                    security_per_day: 60.0,
                    material_kg_per_sqm: 25.0,
                    freight_per_kg: 0.4,
                    freight_per_cbm: 0.0,
                    freight_per_km: 1.2,
                    promoter_per_day: 150.0,
                    uniform_per_person: 30.0,
                    ops_misc_flat: 400.0,
                    print: 300.0,
                    giveaways: 400.0,
                    digital: 500.0,
                    av_production: 600.0,
                    marketing_other_per_sqm: 4.0,
                },
            },
            policy: TaxPolicy {
                gst_pct: 18.0,
                taxable_flags: TaxableFlags::default(),
                contingency_pct: 10.0,
                contingency_base: ContingencyBase::PreTax,
            },
        }
    }
}

/// Unit rates for one estimate, already specialised to the market.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedRates {
    pub domestic: bool,
    pub space_per_sqm: f64,
    pub venue_premium_pct: f64,
    pub construction_per_sqm: f64,
    pub finish_factor: f64,
    pub airfare_per_person: f64,
    pub hotel_nightly_rate: f64,
    pub route_km: f64,
    pub unit: UnitRates,
}

/// Looks up unit rates in an injected `RateTables`.
pub struct RateResolver<'a> {
    tables: &'a RateTables,
}

/// Table lookup with default-key fallback. A missing or unknown key falls back
/// to the table's default key; the amount is 0 only when the default key itself
/// is absent from the table.
fn lookup_or_default<K, V>(
    table: &BTreeMap<K, V>,
    key: Option<K>,
    default: K,
    raw: &str,
    what: &str,
) -> Option<V>
where
    K: Ord + Copy + std::fmt::Display,
    V: Copy,
{
    if let Some(v) = key.and_then(|k| table.get(&k)) {
        return Some(*v);
    }
    if !raw.trim().is_empty() {
        warn!(%what, key = raw, fallback = %default, "rate table miss, using default key");
    }
    let v = table.get(&default).copied();
    if v.is_none() {
        warn!(%what, fallback = %default, "default key missing from rate table");
    }
    v
}

impl<'a> RateResolver<'a> {
    pub fn new(tables: &'a RateTables) -> Self {
        Self { tables }
    }

    /// INR quotes, an explicit domestic market level, or an Indian state
    /// code on either end of the trip all classify the estimate as domestic.
    pub fn is_domestic(&self, form: &NormalizedForm) -> bool {
        form.currency.trim().eq_ignore_ascii_case(DOMESTIC_CURRENCY)
            || parse_key::<MarketLevel>(&form.market_level) == Some(MarketLevel::Domestic)
            || is_domestic_state(&form.origin_state)
            || is_domestic_state(&form.destination_state)
    }

    pub fn space_rate(&self, domestic: bool, city: &str, market_level: &str) -> f64 {
        if !domestic {
            let factor = parse_key::<MarketLevel>(market_level)
                .map(MarketLevel::international_factor)
                .unwrap_or(1.0);
            return self.tables.international.space_per_sqm * factor;
        }
        lookup_or_default(
            &self.tables.space_per_sqm,
            parse_key(city),
            self.tables.default_city,
            city,
            "space",
        )
        .unwrap_or(0.0)
    }

    /// Per-area construction rate and the booth type's finish factor.
    pub fn construction_rate(&self, domestic: bool, booth_type: &str) -> (f64, f64) {
        let parsed = parse_key::<BoothType>(booth_type);
        let finish = parsed.map(BoothType::finish_factor).unwrap_or(1.0);
        if !domestic {
            return (self.tables.international.construction_per_sqm, finish);
        }
        let rate = lookup_or_default(
            &self.tables.construction_per_sqm,
            parsed,
            self.tables.default_booth_type,
            booth_type,
            "construction",
        )
        .unwrap_or(0.0);
        (rate, finish)
    }

    pub fn venue_premium_pct(&self, venue_type: &str) -> f64 {
        lookup_or_default(
            &self.tables.venue_premium_pct,
            parse_key(venue_type),
            self.tables.default_venue_type,
            venue_type,
            "venue",
        )
        .unwrap_or(0.0)
    }

    pub fn flight_fare(&self, domestic: bool, origin: &str, destination: &str, tier: &str) -> f64 {
        let class = parse_key::<AccommodationTier>(tier)
            .map(AccommodationTier::air_class_multiplier)
            .unwrap_or(1.0);
        if !domestic {
            return self.tables.international.flight_fare * class;
        }
        let from = parse_key::<City>(origin);
        let to = parse_key::<City>(destination);
        let base = match (from, to) {
            (Some(a), Some(b)) if a == b => 0.0,
            (Some(a), Some(b)) => {
                pair_lookup(&self.tables.flights, a, b).unwrap_or(self.tables.domestic_flight_fare)
            }
            _ => self.tables.domestic_flight_fare,
        };
        base * class
    }

    pub fn hotel_rate(&self, domestic: bool, destination: &str, tier: &str) -> f64 {
        let tier = parse_key::<AccommodationTier>(tier).unwrap_or(self.tables.default_accommodation);
        if !domestic {
            return self.tables.international.hotel.for_tier(tier);
        }
        lookup_or_default(
            &self.tables.hotels,
            parse_key(destination),
            self.tables.default_city,
            destination,
            "hotel",
        )
        .map(|h| h.for_tier(tier))
        .unwrap_or(0.0)
    }

    fn is_domestic_location(city: &str, state: &str) -> bool {
        is_domestic_state(state) || parse_key::<City>(city).is_some()
    }

    /// Freight distance. Named city pairs win over the distance bands.
    pub fn route_distance_km(
        &self,
        origin_city: &str,
        origin_state: &str,
        destination_city: &str,
        destination_state: &str,
    ) -> f64 {
        let from = parse_key::<City>(origin_city);
        let to = parse_key::<City>(destination_city);
        if let (Some(a), Some(b)) = (from, to) {
            if let Some(km) = pair_lookup(&self.tables.route_distances_km, a, b) {
                return km;
            }
        }
        let bands = &self.tables.distance_bands;
        let same_city = match (from, to) {
            (Some(a), Some(b)) => a == b,
            _ => {
                !origin_city.trim().is_empty()
                    && origin_city.trim().eq_ignore_ascii_case(destination_city.trim())
            }
        };
        let same_state = origin_state.trim().eq_ignore_ascii_case(destination_state.trim());
        let origin_domestic = Self::is_domestic_location(origin_city, origin_state);
        let destination_domestic = Self::is_domestic_location(destination_city, destination_state);

        if same_city && same_state {
            bands.same_city_km
        } else if same_state && !origin_state.trim().is_empty() {
            bands.same_state_km
        } else if origin_domestic && destination_domestic {
            bands.inter_state_km
        } else if origin_domestic {
            bands.international_km
        } else {
            bands.fallback_km
        }
    }

    pub fn resolve(&self, form: &NormalizedForm) -> ResolvedRates {
        let domestic = self.is_domestic(form);
        let (construction_per_sqm, finish_factor) =
            self.construction_rate(domestic, &form.booth_type);
        let rates = ResolvedRates {
            domestic,
            space_per_sqm: self.space_rate(domestic, &form.destination_city, &form.market_level),
            venue_premium_pct: self.venue_premium_pct(&form.venue_type),
            construction_per_sqm,
            finish_factor,
            airfare_per_person: self.flight_fare(
                domestic,
                &form.origin_city,
                &form.destination_city,
                &form.accommodation_level,
            ),
            hotel_nightly_rate: self.hotel_rate(
                domestic,
                &form.destination_city,
                &form.accommodation_level,
            ),
            route_km: self.route_distance_km(
                &form.origin_city,
                &form.origin_state,
                &form.destination_city,
                &form.destination_state,
            ),
            unit: if domestic {
                self.tables.unit_rates
            } else {
                self.tables.international.unit_rates
            },
        };
        debug!(?rates, "resolved rates");
        rates
    }
}
