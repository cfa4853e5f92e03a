use serde::{Deserialize, Serialize};

use super::{
    AddressFields, FieldValue, FormState, KeySequence, ResourceForm, flatten_address, non_empty,
    telecom_entries, text_or_empty,
};
use crate::error::FormError;
use crate::resources::Organization;
use crate::resources::datatypes::{CodeableConcept, ContactPointSystem, first_telecom};

/// Code system for `Organization.type`
pub const ORGANIZATION_TYPE_SYSTEM: &str =
    "http://terminology.hl7.org/CodeSystem/organization-type";

/// Editable state of the organization create and detail pages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrganizationForm {
    pub name: String,
    /// organization-type code (prov, dept, team, govt, ins, edu, ...)
    #[serde(rename = "type")]
    pub org_type: String,
    pub active: bool,
    pub phone: String,
    pub email: String,
    pub website: String,
    pub address_line1: String,
    pub address_line2: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
}

impl Default for OrganizationForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            org_type: String::new(),
            active: true,
            phone: String::new(),
            email: String::new(),
            website: String::new(),
            address_line1: String::new(),
            address_line2: String::new(),
            city: String::new(),
            state: String::new(),
            postal_code: String::new(),
            country: String::new(),
        }
    }
}

impl OrganizationForm {
    fn write_into(&self, org: &mut Organization) {
        org.name = non_empty(&self.name);
        org.active = Some(self.active);
        org.telecom = telecom_entries(
            &[
                (ContactPointSystem::Phone, self.phone.as_str()),
                (ContactPointSystem::Email, self.email.as_str()),
                (ContactPointSystem::Url, self.website.as_str()),
            ],
            Some("work"),
        );
        org.address = AddressFields {
            line1: &self.address_line1,
            line2: &self.address_line2,
            city: &self.city,
            state: &self.state,
            postal_code: &self.postal_code,
            country: &self.country,
        }
        .to_addresses("work", Some("both"));
        org.org_type = non_empty(&self.org_type)
            .map(|code| CodeableConcept::coded(Some(ORGANIZATION_TYPE_SYSTEM), code))
            .into_iter()
            .collect();
    }
}

impl FormState for OrganizationForm {
    fn set_field(&mut self, field: &str, value: FieldValue) -> Result<(), FormError> {
        let slot = match field {
            "active" => {
                self.active = value.into_flag(field)?;
                return Ok(());
            }
            "name" => &mut self.name,
            "type" => &mut self.org_type,
            "phone" => &mut self.phone,
            "email" => &mut self.email,
            "website" => &mut self.website,
            "addressLine1" => &mut self.address_line1,
            "addressLine2" => &mut self.address_line2,
            "city" => &mut self.city,
            "state" => &mut self.state,
            "postalCode" => &mut self.postal_code,
            "country" => &mut self.country,
            _ => return Err(FormError::UnknownField(field.to_string())),
        };
        *slot = value.into_text(field)?;
        Ok(())
    }
}

impl ResourceForm for OrganizationForm {
    type Resource = Organization;

    const LABEL: &'static str = "organization";

    fn blank(_keys: &mut KeySequence) -> Self {
        Self::default()
    }

    fn to_resource(&self) -> Organization {
        let mut org = Organization::new();
        self.write_into(&mut org);
        org
    }

    fn apply_to(&self, mut existing: Organization) -> Organization {
        self.write_into(&mut existing);
        existing
    }

    fn from_resource(org: &Organization, _keys: &mut KeySequence) -> Self {
        let [address_line1, address_line2, city, state, postal_code, country] =
            flatten_address(&org.address);

        Self {
            name: text_or_empty(org.name.as_deref()),
            org_type: text_or_empty(org.org_type.first().and_then(CodeableConcept::first_code)),
            active: org.active != Some(false),
            phone: text_or_empty(first_telecom(&org.telecom, ContactPointSystem::Phone)),
            email: text_or_empty(first_telecom(&org.telecom, ContactPointSystem::Email)),
            website: text_or_empty(first_telecom(&org.telecom, ContactPointSystem::Url)),
            address_line1,
            address_line2,
            city,
            state,
            postal_code,
            country,
        }
    }
}
