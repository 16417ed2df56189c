use core::fmt;
use std::{borrow::Cow, collections::HashSet, str::FromStr};

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

const FORMAT_JWT: &str = "jwt";
const FORMAT_JWT_VC: &str = "jwt_vc";
const FORMAT_JWT_VP: &str = "jwt_vp";
const FORMAT_JWT_VC_JSON: &str = "jwt_vc_json";
const FORMAT_JWT_VP_JSON: &str = "jwt_vp_json";
const FORMAT_LDP: &str = "ldp";
const FORMAT_LDP_VC: &str = "ldp_vc";
const FORMAT_LDP_VP: &str = "ldp_vp";
const FORMAT_AC_VC: &str = "ac_vc";
const FORMAT_AC_VP: &str = "ac_vp";
const FORMAT_MSO_MDOC: &str = "mso_mdoc";
const FORMAT_SD_JWT: &str = "sd_jwt";

/// The claim format designation identifies the data format of a
/// [Claim](https://identity.foundation/presentation-exchange/spec/v2.0.0/#term:claim).
///
/// Registry of claim format types: <https://identity.foundation/claim-format-registry/#registry>
///
/// Designations are case-sensitive tokens: `"JWT"` is parsed as
/// [ClaimFormatDesignation::Other] and never equals [ClaimFormatDesignation::Jwt].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ClaimFormatDesignation {
    /// A JSON Web Token as defined by [RFC7519](https://identity.foundation/claim-format-registry/#ref:RFC7519).
    /// Supported algorithms are conveyed with an `alg` property.
    Jwt,

    /// W3C Verifiable Credential secured as a JWT.
    JwtVc,

    /// W3C Verifiable Presentation secured as a JWT.
    JwtVp,

    JwtVcJson,

    JwtVpJson,

    /// A Linked-Data Proof submitted as an object. Supported proof suites are
    /// conveyed with a `proof_type` property.
    Ldp,

    /// W3C Verifiable Credential signed with a Linked-Data Proof.
    LdpVc,

    /// W3C Verifiable Presentation signed with a Linked-Data Proof.
    LdpVp,

    /// AnonCreds Verifiable Credential.
    AcVc,

    /// AnonCreds Verifiable Presentation.
    AcVp,

    /// ISO/IEC 18013-5:2021 mobile document (mdoc).
    MsoMDoc,

    /// Selective Disclosure JWT.
    SdJwt,

    /// Any other designation, kept verbatim.
    Other(String),
}

impl ClaimFormatDesignation {
    pub fn from_name(name: Cow<str>) -> Self {
        match name.as_ref() {
            FORMAT_JWT => Self::Jwt,
            FORMAT_JWT_VC => Self::JwtVc,
            FORMAT_JWT_VP => Self::JwtVp,
            FORMAT_JWT_VC_JSON => Self::JwtVcJson,
            FORMAT_JWT_VP_JSON => Self::JwtVpJson,
            FORMAT_LDP => Self::Ldp,
            FORMAT_LDP_VC => Self::LdpVc,
            FORMAT_LDP_VP => Self::LdpVp,
            FORMAT_AC_VC => Self::AcVc,
            FORMAT_AC_VP => Self::AcVp,
            FORMAT_MSO_MDOC => Self::MsoMDoc,
            FORMAT_SD_JWT => Self::SdJwt,
            _ => Self::Other(name.into_owned()),
        }
    }

    /// Return the designation token, e.g. `jwt_vc` or `mso_mdoc`.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Jwt => FORMAT_JWT,
            Self::JwtVc => FORMAT_JWT_VC,
            Self::JwtVp => FORMAT_JWT_VP,
            Self::JwtVcJson => FORMAT_JWT_VC_JSON,
            Self::JwtVpJson => FORMAT_JWT_VP_JSON,
            Self::Ldp => FORMAT_LDP,
            Self::LdpVc => FORMAT_LDP_VC,
            Self::LdpVp => FORMAT_LDP_VP,
            Self::AcVc => FORMAT_AC_VC,
            Self::AcVp => FORMAT_AC_VP,
            Self::MsoMDoc => FORMAT_MSO_MDOC,
            Self::SdJwt => FORMAT_SD_JWT,
            Self::Other(other) => other,
        }
    }
}

impl From<&str> for ClaimFormatDesignation {
    fn from(s: &str) -> Self {
        Self::from_name(Cow::Borrowed(s))
    }
}

impl From<String> for ClaimFormatDesignation {
    fn from(value: String) -> Self {
        Self::from_name(Cow::Owned(value))
    }
}

impl FromStr for ClaimFormatDesignation {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(s.into())
    }
}

impl From<ClaimFormatDesignation> for String {
    fn from(format: ClaimFormatDesignation) -> Self {
        match format {
            ClaimFormatDesignation::Other(other) => other,
            known => known.as_str().to_owned(),
        }
    }
}

impl fmt::Display for ClaimFormatDesignation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_str().fmt(f)
    }
}

impl Serialize for ClaimFormatDesignation {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.as_str().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ClaimFormatDesignation {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(Into::into)
    }
}

/// One accepted claim format and its format-specific parameters,
/// e.g. `jwt_vc: { "alg": ["ES256"] }` or `ldp_vp: { "proof_type": ["Ed25519Signature2018"] }`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormatDescriptor {
    designation: ClaimFormatDesignation,
    params: Map<String, Value>,
}

impl FormatDescriptor {
    pub fn new(designation: impl Into<ClaimFormatDesignation>) -> Self {
        Self {
            designation: designation.into(),
            params: Map::new(),
        }
    }

    /// Set a format-specific parameter, e.g. `alg` or `proof_type`.
    pub fn set_param(mut self, key: impl Into<String>, value: Value) -> Self {
        self.params.insert(key.into(), value);
        self
    }

    pub fn designation(&self) -> &ClaimFormatDesignation {
        &self.designation
    }

    pub fn params(&self) -> &Map<String, Value> {
        &self.params
    }

    /// Return the signing algorithms listed under `alg` or `alg_values_supported`.
    pub fn algorithms(&self) -> Vec<&str> {
        ["alg", "alg_values_supported"]
            .into_iter()
            .flat_map(|key| self.string_list(key))
            .collect()
    }

    /// Return the Linked-Data proof suites listed under `proof_type`.
    pub fn proof_types(&self) -> Vec<&str> {
        self.string_list("proof_type")
    }

    fn string_list(&self, key: &str) -> Vec<&str> {
        self.params
            .get(key)
            .and_then(Value::as_array)
            .map(|values| values.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }
}

/// The set of claim formats a [Verifier](https://identity.foundation/presentation-exchange/spec/v2.0.0/#term:verifier)
/// can process, carried by the `format` property of a presentation definition or an input descriptor.
///
/// On the wire the container is an object keyed by designation:
///
/// ```json
/// { "jwt_vc": { "alg": ["ES256"] }, "ldp_vc": { "proof_type": ["Ed25519Signature2018"] } }
/// ```
///
/// Two containers are equal when they list the same set of designations; parameters are
/// not compared. A present but empty container accepts no format at all.
#[derive(Clone, Debug, Default)]
pub struct FormatContainer {
    formats: Vec<FormatDescriptor>,
}

impl FormatContainer {
    pub fn new(formats: Vec<FormatDescriptor>) -> Self {
        Self { formats }
    }

    /// Add a format, replacing any existing descriptor with the same designation.
    pub fn add_format(mut self, format: FormatDescriptor) -> Self {
        self.formats
            .retain(|existing| existing.designation.as_str() != format.designation.as_str());
        self.formats.push(format);
        self
    }

    pub fn formats(&self) -> &[FormatDescriptor] {
        &self.formats
    }

    pub fn is_empty(&self) -> bool {
        self.formats.is_empty()
    }

    /// Return the designations of the container as a hash set.
    pub fn designations(&self) -> HashSet<&str> {
        self.formats
            .iter()
            .map(|format| format.designation.as_str())
            .collect()
    }

    /// Return the descriptor for the given designation, if accepted.
    pub fn get(&self, designation: &ClaimFormatDesignation) -> Option<&FormatDescriptor> {
        self.formats
            .iter()
            .find(|format| format.designation.as_str() == designation.as_str())
    }

    /// Case-sensitive membership test.
    pub fn contains(&self, designation: &ClaimFormatDesignation) -> bool {
        self.get(designation).is_some()
    }
}

impl PartialEq for FormatContainer {
    fn eq(&self, other: &Self) -> bool {
        self.designations() == other.designations()
    }
}

impl Eq for FormatContainer {}

impl Serialize for FormatContainer {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let map: Map<String, Value> = self
            .formats
            .iter()
            .map(|format| {
                (
                    format.designation.as_str().to_owned(),
                    Value::Object(format.params.clone()),
                )
            })
            .collect();

        map.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for FormatContainer {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Map::<String, Value>::deserialize(deserializer)?
            .into_iter()
            .map(|(designation, params)| match params {
                Value::Object(params) => Ok(FormatDescriptor {
                    designation: designation.into(),
                    params,
                }),
                other => Err(de::Error::custom(
                    crate::core::presentation_definition::PresentationError::InvalidFormat(
                        format!("parameters of `{designation}` must be an object, found {other}"),
                    ),
                )),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    #[test]
    fn format_container_deserialization() {
        let value = json!({
          "format": {
            "jwt_vc": {
              "alg": ["ES256", "EdDSA"],
              "proof_type": ["JsonWebSignature2020"]
            },
            "ldp_vc": {
              "proof_type": ["Ed25519Signature2018", "EcdsaSecp256k1Signature2019"]
            },
            "sd_jwt": {
              "alg": ["ES256", "ES384"],
              "kb_jwt_alg": ["ES256"]
            },
            "com.example.custom_vc": {
              "version": "1.0",
              "encryption": ["AES-GCM"],
              "signature": ["ED25519"]
            }
          }
        });

        let container: FormatContainer = serde_json::from_value(value["format"].clone())
            .expect("Failed to parse format container");

        assert_eq!(container.formats().len(), 4);
        assert!(container.contains(&ClaimFormatDesignation::JwtVc));
        assert!(container.contains(&ClaimFormatDesignation::LdpVc));
        assert!(container.contains(&ClaimFormatDesignation::SdJwt));
        assert!(container.contains(&"com.example.custom_vc".into()));

        let jwt_vc = container.get(&ClaimFormatDesignation::JwtVc).unwrap();
        assert_eq!(jwt_vc.algorithms(), vec!["ES256", "EdDSA"]);
        assert_eq!(jwt_vc.proof_types(), vec!["JsonWebSignature2020"]);
    }

    #[test]
    fn format_container_rejects_non_object_params() {
        let result = serde_json::from_value::<FormatContainer>(json!({ "jwt": ["ES256"] }));
        let error = result.unwrap_err().to_string();
        assert!(error.contains("invalid claim format"), "{error}");
    }

    #[test]
    fn designation_membership_is_case_sensitive() {
        let container = FormatContainer::default().add_format(FormatDescriptor::new("jwt"));

        assert!(container.contains(&"jwt".into()));
        assert!(!container.contains(&"JWT".into()));
        assert_eq!(
            ClaimFormatDesignation::from("JWT"),
            ClaimFormatDesignation::Other("JWT".into())
        );
    }

    #[test]
    fn equality_over_designations() {
        let a = FormatContainer::default()
            .add_format(FormatDescriptor::new("jwt").set_param("alg", json!(["ES256"])))
            .add_format(FormatDescriptor::new("ldp"));
        let b = FormatContainer::default()
            .add_format(FormatDescriptor::new("ldp").set_param("proof_type", json!(["X"])))
            .add_format(FormatDescriptor::new("jwt"));
        let c = FormatContainer::default().add_format(FormatDescriptor::new("jwt"));

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn format_container_round_trip() {
        let value = json!({ "mso_mdoc": { "alg": ["ES256"] }, "jwt_vp_json": {} });
        let container: FormatContainer = serde_json::from_value(value.clone()).unwrap();

        assert_eq!(serde_json::to_value(&container).unwrap(), value);
    }
}
