use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{
    EntryKey, FieldValue, FormState, KeySequence, ResourceForm, date_input, non_empty,
    normalize_date, telecom_entries, text_or_empty,
};
use crate::error::FormError;
use crate::resources::datatypes::{
    CodeableConcept, ContactPointSystem, HumanName, Period, Reference, first_telecom,
};
use crate::resources::{Practitioner, Qualification};

/// Code system for qualification codes (HL7 v2 table 0360, degree/license)
pub const QUALIFICATION_SYSTEM: &str = "http://terminology.hl7.org/CodeSystem/v2-0360";

/// Code system for communication languages
pub const LANGUAGE_SYSTEM: &str = "urn:ietf:bcp:47";

/// One repeatable qualification sub-form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QualificationForm {
    pub key: EntryKey,
    pub text: String,
    pub code: String,
    pub issuer: String,
    pub start_date: String,
    pub end_date: String,
}

impl QualificationForm {
    pub fn blank(key: EntryKey) -> Self {
        Self {
            key,
            ..Self::default()
        }
    }

    fn from_qualification(qualification: &Qualification, key: EntryKey) -> Self {
        let period = qualification.period.as_ref();
        Self {
            key,
            text: text_or_empty(qualification.code.text.as_deref()),
            code: text_or_empty(qualification.code.first_code()),
            issuer: text_or_empty(
                qualification
                    .issuer
                    .as_ref()
                    .and_then(|i| i.display.as_deref()),
            ),
            start_date: date_input(period.and_then(|p| p.start.as_deref())),
            end_date: date_input(period.and_then(|p| p.end.as_deref())),
        }
    }

    /// `None` for sub-forms whose text is blank
    fn to_qualification(&self, issued_on: Option<NaiveDate>) -> Option<Qualification> {
        let text = non_empty(&self.text)?;

        let mut code = CodeableConcept {
            coding: Vec::new(),
            text: Some(text),
        };
        if let Some(c) = non_empty(&self.code) {
            code.coding = CodeableConcept::coded(Some(QUALIFICATION_SYSTEM), c).coding;
        }

        let start = normalize_date(&self.start_date)
            .or_else(|| issued_on.map(|d| d.format("%Y-%m-%d").to_string()));
        let end = normalize_date(&self.end_date);

        Some(Qualification {
            identifier: Vec::new(),
            code,
            period: Period::from_bounds(start, end),
            issuer: non_empty(&self.issuer).map(|display| Reference {
                reference: None,
                display: Some(display),
            }),
        })
    }

    fn set_field(&mut self, field: &str, value: FieldValue) -> Result<(), FormError> {
        let slot = match field {
            "text" => &mut self.text,
            "code" => &mut self.code,
            "issuer" => &mut self.issuer,
            "startDate" => &mut self.start_date,
            "endDate" => &mut self.end_date,
            _ => return Err(FormError::UnknownField(format!("qualification.{}", field))),
        };
        *slot = value.into_text(field)?;
        Ok(())
    }
}

/// Editable state of the practitioner create and detail pages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PractitionerForm {
    pub prefix: String,
    pub given_name: String,
    pub family_name: String,
    pub suffix: String,
    pub gender: String,
    pub birth_date: String,
    pub phone: String,
    pub email: String,
    /// BCP-47 language code
    pub communication: String,
    pub active: bool,
    pub qualifications: Vec<QualificationForm>,
}

impl Default for PractitionerForm {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            given_name: String::new(),
            family_name: String::new(),
            suffix: String::new(),
            gender: String::new(),
            birth_date: String::new(),
            phone: String::new(),
            email: String::new(),
            communication: String::new(),
            active: true,
            qualifications: Vec::new(),
        }
    }
}

impl PractitionerForm {
    /// Build a new practitioner, stamping `issued_on` as the start of any
    /// qualification entered without a start date
    pub fn to_resource_issued_on(&self, issued_on: NaiveDate) -> Practitioner {
        let mut practitioner = Practitioner::new();
        self.write_into(&mut practitioner, Some(issued_on));
        practitioner
    }

    /// Append a blank qualification sub-form and return its key
    pub fn add_qualification(&mut self, keys: &mut KeySequence) -> EntryKey {
        let key = keys.next_key();
        self.qualifications.push(QualificationForm::blank(key));
        key
    }

    /// Remove a qualification sub-form.
    ///
    /// The last remaining sub-form is kept so the page always shows one.
    pub fn remove_qualification(&mut self, key: EntryKey) -> Result<bool, FormError> {
        let index = self.qualification_index(key)?;
        if self.qualifications.len() <= 1 {
            return Ok(false);
        }
        self.qualifications.remove(index);
        Ok(true)
    }

    pub fn set_qualification_field(
        &mut self,
        key: EntryKey,
        field: &str,
        value: FieldValue,
    ) -> Result<(), FormError> {
        let index = self.qualification_index(key)?;
        self.qualifications[index].set_field(field, value)
    }

    fn qualification_index(&self, key: EntryKey) -> Result<usize, FormError> {
        self.qualifications
            .iter()
            .position(|q| q.key == key)
            .ok_or_else(|| FormError::UnknownEntry(key.to_string()))
    }

    fn write_into(&self, practitioner: &mut Practitioner, issued_on: Option<NaiveDate>) {
        practitioner.active = Some(self.active);

        let name = HumanName {
            name_use: Some("official".to_string()),
            family: non_empty(&self.family_name),
            given: non_empty(&self.given_name).into_iter().collect(),
            prefix: non_empty(&self.prefix).into_iter().collect(),
            suffix: non_empty(&self.suffix).into_iter().collect(),
            ..HumanName::default()
        };
        let unnamed = name.family.is_none()
            && name.given.is_empty()
            && name.prefix.is_empty()
            && name.suffix.is_empty();
        practitioner.name = if unnamed { Vec::new() } else { vec![name] };

        practitioner.telecom = telecom_entries(
            &[
                (ContactPointSystem::Phone, self.phone.as_str()),
                (ContactPointSystem::Email, self.email.as_str()),
            ],
            Some("work"),
        );
        practitioner.gender = non_empty(&self.gender);
        practitioner.birth_date = normalize_date(&self.birth_date);
        practitioner.qualification = self
            .qualifications
            .iter()
            .filter_map(|q| q.to_qualification(issued_on))
            .collect();
        practitioner.communication = non_empty(&self.communication)
            .map(|code| CodeableConcept::coded(Some(LANGUAGE_SYSTEM), code))
            .into_iter()
            .collect();
    }
}

impl FormState for PractitionerForm {
    fn set_field(&mut self, field: &str, value: FieldValue) -> Result<(), FormError> {
        let slot = match field {
            "active" => {
                self.active = value.into_flag(field)?;
                return Ok(());
            }
            "prefix" => &mut self.prefix,
            "givenName" => &mut self.given_name,
            "familyName" => &mut self.family_name,
            "suffix" => &mut self.suffix,
            "gender" => &mut self.gender,
            "birthDate" => &mut self.birth_date,
            "phone" => &mut self.phone,
            "email" => &mut self.email,
            "communication" => &mut self.communication,
            _ => return Err(FormError::UnknownField(field.to_string())),
        };
        *slot = value.into_text(field)?;
        Ok(())
    }
}

impl ResourceForm for PractitionerForm {
    type Resource = Practitioner;

    const LABEL: &'static str = "practitioner";

    fn blank(keys: &mut KeySequence) -> Self {
        let mut form = Self::default();
        form.add_qualification(keys);
        form
    }

    fn to_resource(&self) -> Practitioner {
        self.to_resource_issued_on(Utc::now().date_naive())
    }

    fn apply_to(&self, mut existing: Practitioner) -> Practitioner {
        self.write_into(&mut existing, None);
        existing
    }

    fn from_resource(practitioner: &Practitioner, keys: &mut KeySequence) -> Self {
        let name = practitioner.name.first();

        let mut qualifications: Vec<QualificationForm> = practitioner
            .qualification
            .iter()
            .map(|q| QualificationForm::from_qualification(q, keys.next_key()))
            .collect();
        if qualifications.is_empty() {
            qualifications.push(QualificationForm::blank(keys.next_key()));
        }

        Self {
            prefix: text_or_empty(name.and_then(HumanName::first_prefix)),
            given_name: text_or_empty(name.and_then(HumanName::first_given)),
            family_name: text_or_empty(name.and_then(|n| n.family.as_deref())),
            suffix: text_or_empty(name.and_then(HumanName::first_suffix)),
            gender: text_or_empty(practitioner.gender.as_deref()),
            birth_date: date_input(practitioner.birth_date.as_deref()),
            phone: text_or_empty(first_telecom(&practitioner.telecom, ContactPointSystem::Phone)),
            email: text_or_empty(first_telecom(&practitioner.telecom, ContactPointSystem::Email)),
            communication: text_or_empty(
                practitioner
                    .communication
                    .first()
                    .and_then(CodeableConcept::first_code),
            ),
            active: practitioner.active != Some(false),
            qualifications,
        }
    }

    fn rekey(&mut self, keys: &mut KeySequence) {
        for qualification in &mut self.qualifications {
            qualification.key = keys.next_key();
        }
        if self.qualifications.is_empty() {
            self.add_qualification(keys);
        }
    }
}
