use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CertificateType {
    #[serde(rename = "A Certificate")]
    A,
    #[serde(rename = "B Certificate")]
    B,
    #[serde(rename = "C Certificate")]
    C,
}

impl CertificateType {
    pub fn label(&self) -> &'static str {
        match self {
            CertificateType::A => "A Certificate",
            CertificateType::B => "B Certificate",
            CertificateType::C => "C Certificate",
        }
    }

    /// Accepts "A", "a certificate", "B Certificate", ...
    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().to_uppercase();
        let grade = normalized
            .strip_suffix("CERTIFICATE")
            .unwrap_or(&normalized)
            .trim();
        match grade {
            "A" => Some(CertificateType::A),
            "B" => Some(CertificateType::B),
            "C" => Some(CertificateType::C),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Certificate {
    pub certificate_type: CertificateType,
    pub grade: String,
    pub year: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_certificate_type() {
        assert_eq!(CertificateType::parse("A"), Some(CertificateType::A));
        assert_eq!(CertificateType::parse("b certificate"), Some(CertificateType::B));
        assert_eq!(CertificateType::parse(" C Certificate "), Some(CertificateType::C));
        assert_eq!(CertificateType::parse("D Certificate"), None);
        assert_eq!(CertificateType::parse(""), None);
    }

    #[test]
    fn test_label_round_trips_through_parse() {
        for t in [CertificateType::A, CertificateType::B, CertificateType::C] {
            assert_eq!(CertificateType::parse(t.label()), Some(t));
        }
    }
}
