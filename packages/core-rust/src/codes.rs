//! Fixed response code table shared with external callers.
//!
//! Codes travel as strings (`"200"`, `"LMS0004"`, ...) so that they can be
//! embedded verbatim into JSON responses. The table is a compile-time
//! constant: every code has exactly one English description and there is no
//! way to register new codes at runtime.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Status code carried by every [`Response`](crate::Response).
///
/// Only [`Success`](ResCode::Success), [`ConvertDataFail`](ResCode::ConvertDataFail),
/// [`ConvertJsonFail`](ResCode::ConvertJsonFail) and
/// [`NoDataValid`](ResCode::NoDataValid) are produced by the decoder. The
/// remaining codes are reserved for callers that build their own responses
/// with [`Response::from_code`](crate::Response::from_code).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResCode {
    #[serde(rename = "200")]
    Success,
    #[serde(rename = "LMS0003")]
    GetDataFail,
    /// Type mismatch or unusable input while mapping JSON onto the destination.
    #[serde(rename = "LMS0004")]
    ConvertDataFail,
    #[serde(rename = "LMS0005")]
    OverwriteDataFail,
    /// Input text is not a JSON object.
    #[serde(rename = "LMS0006")]
    ConvertJsonFail,
    #[serde(rename = "LMS0007")]
    InsertDataFail,
    /// At least one destination field was left empty.
    #[serde(rename = "LMS0008")]
    NoDataValid,
    #[serde(rename = "LMS0009")]
    UnknownTransactionType,
    #[serde(rename = "LMS0010")]
    UnknownStatisticsType,
    #[serde(rename = "LMS0011")]
    InsufficientTokenAmount,
    #[serde(rename = "LMS0012")]
    InvalidToken,
    #[serde(rename = "LMS0013")]
    DuplicateMerchants,
    #[serde(rename = "LMS0014")]
    Redeemed,
    #[serde(rename = "LMS0015")]
    Activated,
    #[serde(rename = "LMS0016")]
    Expired,
    #[serde(rename = "LMS0017")]
    NotActivated,
    #[serde(rename = "LMS0018")]
    NotExpired,
    #[serde(rename = "LMS0019")]
    InvalidVoucherWalletAddress,
    #[serde(rename = "LMS0020")]
    VoucherReturnedExpired,
    #[serde(rename = "LMS0021")]
    HtpInsertFail,
}

impl ResCode {
    /// Every code in table order.
    pub const ALL: [ResCode; 20] = [
        ResCode::Success,
        ResCode::GetDataFail,
        ResCode::ConvertDataFail,
        ResCode::OverwriteDataFail,
        ResCode::ConvertJsonFail,
        ResCode::InsertDataFail,
        ResCode::NoDataValid,
        ResCode::UnknownTransactionType,
        ResCode::UnknownStatisticsType,
        ResCode::InsufficientTokenAmount,
        ResCode::InvalidToken,
        ResCode::DuplicateMerchants,
        ResCode::Redeemed,
        ResCode::Activated,
        ResCode::Expired,
        ResCode::NotActivated,
        ResCode::NotExpired,
        ResCode::InvalidVoucherWalletAddress,
        ResCode::VoucherReturnedExpired,
        ResCode::HtpInsertFail,
    ];

    /// Wire representation of the code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ResCode::Success => "200",
            ResCode::GetDataFail => "LMS0003",
            ResCode::ConvertDataFail => "LMS0004",
            ResCode::OverwriteDataFail => "LMS0005",
            ResCode::ConvertJsonFail => "LMS0006",
            ResCode::InsertDataFail => "LMS0007",
            ResCode::NoDataValid => "LMS0008",
            ResCode::UnknownTransactionType => "LMS0009",
            ResCode::UnknownStatisticsType => "LMS0010",
            ResCode::InsufficientTokenAmount => "LMS0011",
            ResCode::InvalidToken => "LMS0012",
            ResCode::DuplicateMerchants => "LMS0013",
            ResCode::Redeemed => "LMS0014",
            ResCode::Activated => "LMS0015",
            ResCode::Expired => "LMS0016",
            ResCode::NotActivated => "LMS0017",
            ResCode::NotExpired => "LMS0018",
            ResCode::InvalidVoucherWalletAddress => "LMS0019",
            ResCode::VoucherReturnedExpired => "LMS0020",
            ResCode::HtpInsertFail => "LMS0021",
        }
    }

    /// Fixed English description of the code.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            ResCode::Success => "OK",
            ResCode::GetDataFail => "Get data fail!",
            ResCode::ConvertDataFail => "Convert data fail!",
            ResCode::OverwriteDataFail => "Overwrite data fail!",
            ResCode::ConvertJsonFail => "Convert Json fail!",
            ResCode::InsertDataFail => "Insert data fail!",
            ResCode::NoDataValid => "No data valid!",
            ResCode::UnknownTransactionType => "Transaction type does not exist",
            ResCode::UnknownStatisticsType => "Statistics type does not exist",
            ResCode::InsufficientTokenAmount => "Token Amount not enough to transaction",
            ResCode::InvalidToken => "Token Invalid",
            ResCode::DuplicateMerchants => "FromMerchant and ToMerchant are duplicate",
            ResCode::Redeemed => "Redeemed",
            ResCode::Activated => "Activated",
            ResCode::Expired => "Expired",
            ResCode::NotActivated => "Not Activated",
            ResCode::NotExpired => "Not Expired",
            ResCode::InvalidVoucherWalletAddress => "Invalid Voucher WalletAddress",
            ResCode::VoucherReturnedExpired => "Voucher is return value for expired",
            ResCode::HtpInsertFail => "HTP error insert data",
        }
    }

    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, ResCode::Success)
    }

    /// Looks up the description for a wire code, `None` if the code is not in the table.
    #[must_use]
    pub fn lookup(code: &str) -> Option<&'static str> {
        code.parse::<ResCode>().ok().map(ResCode::description)
    }
}

impl fmt::Display for ResCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A wire code that is not part of the table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown response code: {0}")]
pub struct UnknownResCode(pub String);

impl FromStr for ResCode {
    type Err = UnknownResCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResCode::ALL
            .into_iter()
            .find(|code| code.as_str() == s)
            .ok_or_else(|| UnknownResCode(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn wire_codes_are_unique() {
        let codes: HashSet<&str> = ResCode::ALL.iter().map(|c| c.as_str()).collect();
        assert_eq!(codes.len(), ResCode::ALL.len());
    }

    #[test]
    fn parse_roundtrips_every_code() {
        for code in ResCode::ALL {
            assert_eq!(code.as_str().parse::<ResCode>(), Ok(code));
        }
    }

    #[test]
    fn parse_rejects_codes_outside_table() {
        assert_eq!(
            "LMS0001".parse::<ResCode>(),
            Err(UnknownResCode("LMS0001".to_string()))
        );
        assert!("".parse::<ResCode>().is_err());
        assert!("lms0004".parse::<ResCode>().is_err());
    }

    #[test]
    fn descriptions_match_table() {
        assert_eq!(ResCode::Success.description(), "OK");
        assert_eq!(ResCode::ConvertDataFail.description(), "Convert data fail!");
        assert_eq!(ResCode::ConvertJsonFail.description(), "Convert Json fail!");
        assert_eq!(ResCode::NoDataValid.description(), "No data valid!");
        assert_eq!(ResCode::HtpInsertFail.description(), "HTP error insert data");
    }

    #[test]
    fn lookup_by_wire_code() {
        assert_eq!(ResCode::lookup("LMS0008"), Some("No data valid!"));
        assert_eq!(ResCode::lookup("LMS9999"), None);
    }

    #[test]
    fn serde_uses_wire_code() {
        let json = serde_json::to_string(&ResCode::ConvertDataFail).expect("serialize");
        assert_eq!(json, "\"LMS0004\"");
        let decoded: ResCode = serde_json::from_str("\"200\"").expect("deserialize");
        assert_eq!(decoded, ResCode::Success);
    }

    #[test]
    fn only_success_is_success() {
        let successes: Vec<ResCode> = ResCode::ALL.into_iter().filter(|c| c.is_success()).collect();
        assert_eq!(successes, vec![ResCode::Success]);
    }

    #[test]
    fn display_is_wire_code() {
        assert_eq!(ResCode::NoDataValid.to_string(), "LMS0008");
    }
}
