//! Fuel type codes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when parsing an unrecognized fuel type code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown fuel type: {code}")]
pub struct UnknownFuelType {
    code: String,
}

/// A recognized fuel type.
///
/// The provider publishes one price column per fuel; this enum is the closed
/// set of columns we understand, in the short codes the API exposes
/// (`gasolina95`, `diesel`, ...). Anything else in a query is a request
/// error rather than a silent empty result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FuelType {
    Gasolina95,
    Gasolina98,
    Diesel,
    DieselPlus,
    GasoleoB,
    GasoleoC,
    Bioetanol,
    Glp,
    Gnc,
    Gnl,
    Hidrogeno,
}

/// Mapping from the provider's price field names to our fuel type codes.
///
/// These are the ~11 column headers observed in the ministry dataset; fields
/// outside this table are ignored by the normalizer.
pub const PROVIDER_PRICE_FIELDS: [(&str, FuelType); 11] = [
    ("Precio Gasolina 95 E5", FuelType::Gasolina95),
    ("Precio Gasolina 98 E5", FuelType::Gasolina98),
    ("Precio Gasoleo A", FuelType::Diesel),
    ("Precio Gasoleo Premium", FuelType::DieselPlus),
    ("Precio Gasoleo B", FuelType::GasoleoB),
    ("Precio Gasoleo C", FuelType::GasoleoC),
    ("Precio Bioetanol", FuelType::Bioetanol),
    ("Precio Gases licuados del petróleo", FuelType::Glp),
    ("Precio Gas Natural Comprimido", FuelType::Gnc),
    ("Precio Gas Natural Licuado", FuelType::Gnl),
    ("Precio Hidrogeno", FuelType::Hidrogeno),
];

impl FuelType {
    /// All recognized fuel types.
    pub const ALL: [FuelType; 11] = [
        FuelType::Gasolina95,
        FuelType::Gasolina98,
        FuelType::Diesel,
        FuelType::DieselPlus,
        FuelType::GasoleoB,
        FuelType::GasoleoC,
        FuelType::Bioetanol,
        FuelType::Glp,
        FuelType::Gnc,
        FuelType::Gnl,
        FuelType::Hidrogeno,
    ];

    /// Parse an API fuel code (e.g. from a query parameter).
    pub fn parse(code: &str) -> Result<Self, UnknownFuelType> {
        match code {
            "gasolina95" => Ok(FuelType::Gasolina95),
            "gasolina98" => Ok(FuelType::Gasolina98),
            "diesel" => Ok(FuelType::Diesel),
            "dieselPlus" => Ok(FuelType::DieselPlus),
            "gasoleoB" => Ok(FuelType::GasoleoB),
            "gasoleoC" => Ok(FuelType::GasoleoC),
            "bioetanol" => Ok(FuelType::Bioetanol),
            "glp" => Ok(FuelType::Glp),
            "gnc" => Ok(FuelType::Gnc),
            "gnl" => Ok(FuelType::Gnl),
            "hidrogeno" => Ok(FuelType::Hidrogeno),
            other => Err(UnknownFuelType {
                code: other.to_string(),
            }),
        }
    }

    /// The API code for this fuel type.
    pub fn as_str(&self) -> &'static str {
        match self {
            FuelType::Gasolina95 => "gasolina95",
            FuelType::Gasolina98 => "gasolina98",
            FuelType::Diesel => "diesel",
            FuelType::DieselPlus => "dieselPlus",
            FuelType::GasoleoB => "gasoleoB",
            FuelType::GasoleoC => "gasoleoC",
            FuelType::Bioetanol => "bioetanol",
            FuelType::Glp => "glp",
            FuelType::Gnc => "gnc",
            FuelType::Gnl => "gnl",
            FuelType::Hidrogeno => "hidrogeno",
        }
    }
}

impl fmt::Display for FuelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
