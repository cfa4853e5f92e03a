use serde::{Deserialize, Serialize};

use super::{
    AddressFields, FieldValue, FormState, KeySequence, ResourceForm, date_input, flatten_address,
    non_empty, normalize_date, telecom_entries, text_or_empty,
};
use crate::error::FormError;
use crate::resources::datatypes::{CodeableConcept, ContactPointSystem, HumanName, first_telecom};
use crate::resources::{Patient, PatientCommunication};

/// Editable state of the patient create and detail pages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PatientForm {
    pub given_name: String,
    pub family_name: String,
    pub birth_date: String,
    pub gender: String,
    pub phone: String,
    pub email: String,
    pub address_line1: String,
    pub address_line2: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    /// BCP-47 code of the preferred language
    pub language: String,
    pub active: bool,
}

impl Default for PatientForm {
    fn default() -> Self {
        Self {
            given_name: String::new(),
            family_name: String::new(),
            birth_date: String::new(),
            gender: String::new(),
            phone: String::new(),
            email: String::new(),
            address_line1: String::new(),
            address_line2: String::new(),
            city: String::new(),
            state: String::new(),
            postal_code: String::new(),
            country: String::new(),
            language: String::new(),
            active: true,
        }
    }
}

impl PatientForm {
    /// Write every member the form owns into `patient`
    fn write_into(&self, patient: &mut Patient) {
        patient.active = Some(self.active);

        let name = HumanName {
            name_use: Some("official".to_string()),
            family: non_empty(&self.family_name),
            given: non_empty(&self.given_name).into_iter().collect(),
            ..HumanName::default()
        };
        patient.name = if name.family.is_none() && name.given.is_empty() {
            Vec::new()
        } else {
            vec![name]
        };

        patient.telecom = telecom_entries(
            &[
                (ContactPointSystem::Phone, self.phone.as_str()),
                (ContactPointSystem::Email, self.email.as_str()),
            ],
            None,
        );
        patient.gender = non_empty(&self.gender);
        patient.birth_date = normalize_date(&self.birth_date);

        patient.address = AddressFields {
            line1: &self.address_line1,
            line2: &self.address_line2,
            city: &self.city,
            state: &self.state,
            postal_code: &self.postal_code,
            country: &self.country,
        }
        .to_addresses("home", None);

        patient.communication = non_empty(&self.language)
            .map(|code| PatientCommunication {
                language: CodeableConcept::coded(None, code),
                preferred: None,
            })
            .into_iter()
            .collect();
    }
}

impl FormState for PatientForm {
    fn set_field(&mut self, field: &str, value: FieldValue) -> Result<(), FormError> {
        let slot = match field {
            "active" => {
                self.active = value.into_flag(field)?;
                return Ok(());
            }
            "givenName" => &mut self.given_name,
            "familyName" => &mut self.family_name,
            "birthDate" => &mut self.birth_date,
            "gender" => &mut self.gender,
            "phone" => &mut self.phone,
            "email" => &mut self.email,
            "addressLine1" => &mut self.address_line1,
            "addressLine2" => &mut self.address_line2,
            "city" => &mut self.city,
            "state" => &mut self.state,
            "postalCode" => &mut self.postal_code,
            "country" => &mut self.country,
            "language" => &mut self.language,
            _ => return Err(FormError::UnknownField(field.to_string())),
        };
        *slot = value.into_text(field)?;
        Ok(())
    }
}

impl ResourceForm for PatientForm {
    type Resource = Patient;

    const LABEL: &'static str = "patient";

    fn blank(_keys: &mut KeySequence) -> Self {
        Self::default()
    }

    fn to_resource(&self) -> Patient {
        let mut patient = Patient::new();
        self.write_into(&mut patient);
        patient
    }

    fn apply_to(&self, mut existing: Patient) -> Patient {
        self.write_into(&mut existing);
        existing
    }

    fn from_resource(patient: &Patient, _keys: &mut KeySequence) -> Self {
        let name = patient.name.first();
        let [address_line1, address_line2, city, state, postal_code, country] =
            flatten_address(&patient.address);

        Self {
            given_name: text_or_empty(name.and_then(HumanName::first_given)),
            family_name: text_or_empty(name.and_then(|n| n.family.as_deref())),
            birth_date: date_input(patient.birth_date.as_deref()),
            gender: text_or_empty(patient.gender.as_deref()),
            phone: text_or_empty(first_telecom(&patient.telecom, ContactPointSystem::Phone)),
            email: text_or_empty(first_telecom(&patient.telecom, ContactPointSystem::Email)),
            address_line1,
            address_line2,
            city,
            state,
            postal_code,
            country,
            language: text_or_empty(
                patient
                    .communication
                    .first()
                    .and_then(|c| c.language.first_code()),
            ),
            active: patient.active != Some(false),
        }
    }
}
