use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Returned when a string does not name a variant of one of the portal enums.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

impl fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {}: {}", self.kind, self.value)
    }
}

impl std::error::Error for ParseEnumError {}

/// How a grain contract is priced and settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ContractType {
    Cash,
    Futures,
    Options,
    Hta,
    Basis,
}

impl ContractType {
    /// Every variant, in declaration order.
    pub const ALL: &'static [ContractType] = &[
        ContractType::Cash,
        ContractType::Futures,
        ContractType::Options,
        ContractType::Hta,
        ContractType::Basis,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContractType::Cash => "CASH",
            ContractType::Futures => "FUTURES",
            ContractType::Options => "OPTIONS",
            ContractType::Hta => "HTA",
            ContractType::Basis => "BASIS",
        }
    }
}

impl fmt::Display for ContractType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContractType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CASH" => Ok(ContractType::Cash),
            "FUTURES" => Ok(ContractType::Futures),
            "OPTIONS" => Ok(ContractType::Options),
            "HTA" => Ok(ContractType::Hta),
            "BASIS" => Ok(ContractType::Basis),
            other => Err(ParseEnumError {
                kind: "contract type",
                value: other.to_string(),
            }),
        }
    }
}

/// Option side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OptionType {
    Put,
    Call,
}

impl OptionType {
    pub const ALL: &'static [OptionType] = &[OptionType::Put, OptionType::Call];

    pub fn as_str(&self) -> &'static str {
        match self {
            OptionType::Put => "PUT",
            OptionType::Call => "CALL",
        }
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OptionType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PUT" => Ok(OptionType::Put),
            "CALL" => Ok(OptionType::Call),
            other => Err(ParseEnumError {
                kind: "option type",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PositionType {
    Long,
    Short,
}

impl PositionType {
    pub const ALL: &'static [PositionType] = &[PositionType::Long, PositionType::Short];

    pub fn as_str(&self) -> &'static str {
        match self {
            PositionType::Long => "LONG",
            PositionType::Short => "SHORT",
        }
    }
}

impl fmt::Display for PositionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PositionType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LONG" => Ok(PositionType::Long),
            "SHORT" => Ok(PositionType::Short),
            other => Err(ParseEnumError {
                kind: "position type",
                value: other.to_string(),
            }),
        }
    }
}

/// Multi-leg option strategies the portal can track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StrategyType {
    Collar,
}

impl StrategyType {
    pub const ALL: &'static [StrategyType] = &[StrategyType::Collar];

    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyType::Collar => "COLLAR",
        }
    }
}

impl fmt::Display for StrategyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "COLLAR" => Ok(StrategyType::Collar),
            other => Err(ParseEnumError {
                kind: "strategy type",
                value: other.to_string(),
            }),
        }
    }
}
