use fhir_desk_core::{
    EntryKey, FhirResource, FieldValue, FormError, KeySequence, PractitionerForm, ResourceForm,
};
use serde::Serialize;

use super::{PageError, title};
use crate::client::ResourceClient;

/// Rendered create page
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateView<F> {
    pub form: F,
    pub loading: bool,
    pub error: Option<String>,
}

/// Create form for one resource type
pub struct CreatePage<F: ResourceForm> {
    client: ResourceClient<F::Resource>,
    keys: KeySequence,
    form: F,
    loading: bool,
    error: Option<String>,
}

impl<F: ResourceForm> CreatePage<F> {
    pub fn new(client: ResourceClient<F::Resource>) -> Self {
        let mut keys = KeySequence::new();
        let form = F::blank(&mut keys);
        Self {
            client,
            keys,
            form,
            loading: false,
            error: None,
        }
    }

    /// Page holding a form submitted in one piece
    pub fn with_form(client: ResourceClient<F::Resource>, mut form: F) -> Self {
        let mut keys = KeySequence::new();
        form.rekey(&mut keys);
        Self {
            client,
            keys,
            form,
            loading: false,
            error: None,
        }
    }

    pub fn form(&self) -> &F {
        &self.form
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn handle_change(
        &mut self,
        field: &str,
        value: impl Into<FieldValue>,
    ) -> Result<(), FormError> {
        self.form.set_field(field, value.into())
    }

    /// Map the form and create the resource.
    ///
    /// On failure the banner is set and the form is kept for another try.
    pub async fn submit(&mut self) -> Result<F::Resource, PageError> {
        self.loading = true;
        self.error = None;

        let result = self.client.create(&self.form.to_resource()).await;
        self.loading = false;

        match result {
            Ok(created) => {
                tracing::info!(
                    id = created.id().unwrap_or_default(),
                    "{} created successfully",
                    title(F::LABEL)
                );
                Ok(created)
            }
            Err(err) => {
                self.error = Some(format!("Failed to create {}: {}", F::LABEL, err));
                Err(err.into())
            }
        }
    }

    pub fn view(&self) -> CreateView<F> {
        CreateView {
            form: self.form.clone(),
            loading: self.loading,
            error: self.error.clone(),
        }
    }
}

impl CreatePage<PractitionerForm> {
    pub fn add_qualification(&mut self) -> EntryKey {
        self.form.add_qualification(&mut self.keys)
    }

    pub fn remove_qualification(&mut self, key: EntryKey) -> Result<bool, FormError> {
        self.form.remove_qualification(key)
    }

    pub fn set_qualification_field(
        &mut self,
        key: EntryKey,
        field: &str,
        value: impl Into<FieldValue>,
    ) -> Result<(), FormError> {
        self.form.set_qualification_field(key, field, value.into())
    }
}
