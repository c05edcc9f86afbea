//! FHIR resource types and reference parsing
//!
//! This module defines the fixed set of resource types the ingestion engine
//! knows about: the root `Patient` type and the linked types that reference
//! a patient. Each linked type carries the search parameter name (`subject`
//! or `patient`) used to query records by patient reference.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Search parameter used to query a linked resource by patient reference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkParam {
    /// Resources referencing the patient via `subject`
    Subject,
    /// Resources referencing the patient via `patient`
    Patient,
}

impl LinkParam {
    /// The query-parameter name as it appears on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkParam::Subject => "subject",
            LinkParam::Patient => "patient",
        }
    }
}

/// A FHIR resource type handled by the ingestion engine
///
/// `Patient` is the root type; every other variant is a linked type that
/// references exactly one patient. The set is static configuration, not
/// runtime state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ResourceType {
    Patient,
    Condition,
    Observation,
    Encounter,
    MedicationRequest,
    Procedure,
    AllergyIntolerance,
    Device,
    Immunization,
}

impl ResourceType {
    /// All linked (non-root) resource types, in declaration order
    pub fn all_linked() -> &'static [ResourceType] {
        &[
            ResourceType::Condition,
            ResourceType::Observation,
            ResourceType::Encounter,
            ResourceType::MedicationRequest,
            ResourceType::Procedure,
            ResourceType::AllergyIntolerance,
            ResourceType::Device,
            ResourceType::Immunization,
        ]
    }

    /// The canonical FHIR type name (e.g. `MedicationRequest`)
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Patient => "Patient",
            ResourceType::Condition => "Condition",
            ResourceType::Observation => "Observation",
            ResourceType::Encounter => "Encounter",
            ResourceType::MedicationRequest => "MedicationRequest",
            ResourceType::Procedure => "Procedure",
            ResourceType::AllergyIntolerance => "AllergyIntolerance",
            ResourceType::Device => "Device",
            ResourceType::Immunization => "Immunization",
        }
    }

    /// Directory name in the staging area (lower-cased type name)
    pub fn dir_name(&self) -> String {
        self.as_str().to_lowercase()
    }

    /// True for the root type
    pub fn is_root(&self) -> bool {
        matches!(self, ResourceType::Patient)
    }

    /// The search parameter used to query this type by patient reference
    ///
    /// Returns `None` for the root type, which is listed rather than queried
    /// per patient.
    pub fn link_param(&self) -> Option<LinkParam> {
        match self {
            ResourceType::Patient => None,
            ResourceType::Condition
            | ResourceType::Observation
            | ResourceType::Encounter
            | ResourceType::MedicationRequest
            | ResourceType::Procedure => Some(LinkParam::Subject),
            ResourceType::AllergyIntolerance | ResourceType::Device | ResourceType::Immunization => {
                Some(LinkParam::Patient)
            }
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Patient" => Ok(ResourceType::Patient),
            "Condition" => Ok(ResourceType::Condition),
            "Observation" => Ok(ResourceType::Observation),
            "Encounter" => Ok(ResourceType::Encounter),
            "MedicationRequest" => Ok(ResourceType::MedicationRequest),
            "Procedure" => Ok(ResourceType::Procedure),
            "AllergyIntolerance" => Ok(ResourceType::AllergyIntolerance),
            "Device" => Ok(ResourceType::Device),
            "Immunization" => Ok(ResourceType::Immunization),
            other => Err(format!(
                "Unknown resource type '{other}'. Known types: Patient, Condition, Observation, \
                 Encounter, MedicationRequest, Procedure, AllergyIntolerance, Device, Immunization"
            )),
        }
    }
}

impl TryFrom<String> for ResourceType {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<ResourceType> for String {
    fn from(r: ResourceType) -> Self {
        r.as_str().to_string()
    }
}

/// Extract the `id` field of a raw FHIR resource
pub fn resource_id(resource: &Value) -> Option<&str> {
    resource.get("id").and_then(Value::as_str)
}

/// Extract the referenced patient ID from a linked resource
///
/// Accepts both `subject` and `patient` reference keys regardless of the
/// type's own link parameter, since historical batches may carry either.
/// Only `Patient/`-prefixed references count; the ID is the final path
/// segment of the reference.
pub fn parent_patient_id(resource: &Value) -> Option<&str> {
    let reference = ["subject", "patient"]
        .iter()
        .find_map(|key| resource.get(key))
        .and_then(|r| r.get("reference"))
        .and_then(Value::as_str)?;

    reference
        .strip_prefix("Patient/")
        .map(|rest| rest.rsplit('/').next().unwrap_or(rest))
}
