use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use std::fmt;
use std::str::FromStr;

use crate::error::UnknownVariant;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Persisted column set, in on-the-wire order.
pub const SHEET_HEADERS: [&str; 11] = [
    "Timestamp",
    "Nama User",
    "Telegram User ID",
    "Telegram Link",
    "Paket",
    "Harga (USDT)",
    "Tanggal Mulai",
    "Blockchain Network",
    "Transaction Hash",
    "Explorer Link",
    "Bukti Transfer",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Package {
    Monthly,
    Quarterly,
    Lifetime,
}

impl Package {
    pub const ALL: [Package; 3] = [Package::Monthly, Package::Quarterly, Package::Lifetime];

    pub fn as_str(self) -> &'static str {
        match self {
            Package::Monthly => "Monthly",
            Package::Quarterly => "Quarterly",
            Package::Lifetime => "Lifetime",
        }
    }

    /// Length of the subscription in days, `None` for packages that never expire.
    pub fn duration_days(self) -> Option<u64> {
        match self {
            Package::Monthly => Some(30),
            Package::Quarterly => Some(90),
            Package::Lifetime => None,
        }
    }

    pub fn expiry_from(self, start: NaiveDate) -> Option<NaiveDate> {
        start.checked_add_days(Days::new(self.duration_days()?))
    }
}

impl fmt::Display for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts any letter case and surrounding whitespace on purpose, so rows
/// edited by hand in the store (`"monthly "`) still count toward their
/// package and get an expiry date. Rows this service writes are always in
/// canonical `as_str` form.
impl FromStr for Package {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Package::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownVariant::new("package", s))
    }
}

/// Chains a payment can be proven on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Network {
    Bsc,
    Ethereum,
    Polygon,
    Arbitrum,
    Optimism,
}

impl Network {
    pub const ALL: [Network; 5] = [
        Network::Bsc,
        Network::Ethereum,
        Network::Polygon,
        Network::Arbitrum,
        Network::Optimism,
    ];

    /// Label shown in the form and written to the store.
    pub fn label(self) -> &'static str {
        match self {
            Network::Bsc => "BSC (BEP20)",
            Network::Ethereum => "Ethereum (ERC20)",
            Network::Polygon => "Polygon",
            Network::Arbitrum => "Arbitrum",
            Network::Optimism => "Optimism",
        }
    }

    fn short_name(self) -> &'static str {
        match self {
            Network::Bsc => "BSC",
            Network::Ethereum => "Ethereum",
            Network::Polygon => "Polygon",
            Network::Arbitrum => "Arbitrum",
            Network::Optimism => "Optimism",
        }
    }

    /// Transaction page prefix on the network's block explorer.
    pub fn explorer_tx_base(self) -> &'static str {
        match self {
            Network::Bsc => "https://bscscan.com/tx/",
            Network::Ethereum => "https://etherscan.io/tx/",
            Network::Polygon => "https://polygonscan.com/tx/",
            Network::Arbitrum => "https://arbiscan.io/tx/",
            Network::Optimism => "https://optimistic.etherscan.io/tx/",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Network {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Network::ALL
            .into_iter()
            .find(|n| {
                n.label().eq_ignore_ascii_case(s) || n.short_name().eq_ignore_ascii_case(s)
            })
            .ok_or_else(|| UnknownVariant::new("network", s))
    }
}

/// Proof-of-payment image as received from the form.
#[derive(Debug, Clone)]
pub struct ProofUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Raw registration input, before validation.
#[derive(Debug, Clone)]
pub struct RegistrationForm {
    pub name: String,
    pub chat_user_id: String,
    pub package: Package,
    pub price_usdt: Option<f64>,
    pub start_date: NaiveDate,
    pub network: Network,
    pub tx_hash: String,
    pub proof: Option<ProofUpload>,
}

/// One subscriber signup. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Registration {
    pub name: String,
    pub chat_user_id: String,
    pub package: Package,
    pub price_usdt: f64,
    pub start_date: NaiveDate,
    pub network: Network,
    pub tx_hash: String,
    pub proof_image_ref: String,
    pub chat_link: String,
    pub explorer_link: String,
    pub created_at: DateTime<Utc>,
}

impl Registration {
    pub fn to_row(&self) -> SheetRow {
        SheetRow {
            timestamp: self.created_at.format(TIMESTAMP_FORMAT).to_string(),
            user_name: self.name.clone(),
            chat_user_id: self.chat_user_id.clone(),
            chat_link: self.chat_link.clone(),
            package: self.package.to_string(),
            price_usdt: format!("{:.2}", self.price_usdt),
            start_date: self.start_date.format(DATE_FORMAT).to_string(),
            network: self.network.to_string(),
            tx_hash: self.tx_hash.clone(),
            explorer_link: self.explorer_link.clone(),
            proof_url: self.proof_image_ref.clone(),
        }
    }
}

/// A stored row, string-typed exactly as it sits in the record store.
#[derive(Debug, Clone, Default, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct SheetRow {
    #[serde(rename = "Timestamp")]
    pub timestamp: String,
    #[serde(rename = "Nama User")]
    pub user_name: String,
    #[serde(rename = "Telegram User ID")]
    pub chat_user_id: String,
    #[serde(rename = "Telegram Link")]
    pub chat_link: String,
    #[serde(rename = "Paket")]
    pub package: String,
    #[serde(rename = "Harga (USDT)")]
    pub price_usdt: String,
    #[serde(rename = "Tanggal Mulai")]
    pub start_date: String,
    #[serde(rename = "Blockchain Network")]
    pub network: String,
    #[serde(rename = "Transaction Hash")]
    pub tx_hash: String,
    #[serde(rename = "Explorer Link")]
    pub explorer_link: String,
    #[serde(rename = "Bukti Transfer")]
    pub proof_url: String,
}

impl SheetRow {
    /// Column values in `SHEET_HEADERS` order.
    pub fn values(&self) -> [&str; 11] {
        [
            self.timestamp.as_str(),
            self.user_name.as_str(),
            self.chat_user_id.as_str(),
            self.chat_link.as_str(),
            self.package.as_str(),
            self.price_usdt.as_str(),
            self.start_date.as_str(),
            self.network.as_str(),
            self.tx_hash.as_str(),
            self.explorer_link.as_str(),
            self.proof_url.as_str(),
        ]
    }

    /// Numeric price, `None` when the stored text does not parse.
    pub fn price(&self) -> Option<f64> {
        self.price_usdt.trim().parse::<f64>().ok().filter(|p| p.is_finite())
    }

    pub fn parsed_package(&self) -> Option<Package> {
        self.package.parse().ok()
    }
}
