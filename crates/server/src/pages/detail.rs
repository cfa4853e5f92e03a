use fhir_desk_core::{EntryKey, FieldValue, FormError, KeySequence, PractitionerForm, ResourceForm};
use serde::Serialize;

use super::{Confirmation, PageError, title};
use crate::client::ResourceClient;

/// Rendered detail/edit page
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailView<F, R> {
    pub id: String,
    pub resource: Option<R>,
    pub form: F,
    pub edit_mode: bool,
    pub loading: bool,
    pub error: Option<String>,
    pub notice: Option<String>,
}

/// Detail and edit page for one resource instance
pub struct DetailPage<F: ResourceForm> {
    client: ResourceClient<F::Resource>,
    id: String,
    keys: KeySequence,
    resource: Option<F::Resource>,
    form: F,
    edit_mode: bool,
    loading: bool,
    error: Option<String>,
    notice: Option<String>,
}

impl<F: ResourceForm> DetailPage<F> {
    pub fn new(client: ResourceClient<F::Resource>, id: impl Into<String>) -> Self {
        let mut keys = KeySequence::new();
        let form = F::blank(&mut keys);
        Self {
            client,
            id: id.into(),
            keys,
            resource: None,
            form,
            edit_mode: false,
            loading: false,
            error: None,
            notice: None,
        }
    }

    pub fn resource(&self) -> Option<&F::Resource> {
        self.resource.as_ref()
    }

    pub fn form(&self) -> &F {
        &self.form
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_editing(&self) -> bool {
        self.edit_mode
    }

    /// Fetch the resource and fill the form from it
    pub async fn load(&mut self) -> Result<(), PageError> {
        if self.id.trim().is_empty() {
            self.error = Some(PageError::MissingId(F::LABEL).to_string());
            return Err(PageError::MissingId(F::LABEL));
        }

        self.loading = true;
        self.error = None;
        let result = self.client.get(&self.id).await;
        self.loading = false;

        match result {
            Ok(resource) => {
                self.form = F::from_resource(&resource, &mut self.keys);
                self.resource = Some(resource);
                Ok(())
            }
            Err(err) => {
                self.error = Some(format!(
                    "Failed to load {} data. Please try again later.",
                    F::LABEL
                ));
                Err(err.into())
            }
        }
    }

    pub fn start_edit(&mut self) {
        self.edit_mode = true;
    }

    /// Leave edit mode, discarding edits
    pub fn cancel_edit(&mut self) {
        self.edit_mode = false;
        if let Some(resource) = &self.resource {
            self.form = F::from_resource(resource, &mut self.keys);
        }
    }

    pub fn handle_change(
        &mut self,
        field: &str,
        value: impl Into<FieldValue>,
    ) -> Result<(), FormError> {
        self.form.set_field(field, value.into())
    }

    /// Replace the whole form with one submitted in one piece
    pub fn replace_form(&mut self, mut form: F) {
        form.rekey(&mut self.keys);
        self.form = form;
        self.edit_mode = true;
    }

    /// Overlay the form on the fetched resource, update, then refresh.
    ///
    /// On failure the fetched resource and the form stay as they were.
    pub async fn submit(&mut self) -> Result<(), PageError> {
        let Some(existing) = self.resource.clone() else {
            self.error = Some(PageError::NotLoaded(F::LABEL).to_string());
            return Err(PageError::NotLoaded(F::LABEL));
        };

        self.loading = true;
        self.error = None;
        self.notice = None;
        let updated = self.form.apply_to(existing);
        let result = async {
            self.client.update(&self.id, updated).await?;
            self.client.get(&self.id).await
        }
        .await;
        self.loading = false;

        match result {
            Ok(refreshed) => {
                self.resource = Some(refreshed);
                self.edit_mode = false;
                self.notice = Some(format!("{} updated successfully", title(F::LABEL)));
                Ok(())
            }
            Err(err) => {
                self.error = Some(format!("Failed to update {}: {}", F::LABEL, err));
                Err(err.into())
            }
        }
    }

    /// Delete the resource. Returns `false` without a request when the
    /// user declined.
    pub async fn delete(&mut self, confirmation: Confirmation) -> Result<bool, PageError> {
        if confirmation == Confirmation::Declined {
            return Ok(false);
        }

        self.loading = true;
        self.error = None;
        let result = self.client.remove(&self.id).await;
        self.loading = false;

        match result {
            Ok(()) => {
                self.resource = None;
                self.notice = Some(format!("{} deleted successfully", title(F::LABEL)));
                Ok(true)
            }
            Err(err) => {
                self.error = Some(format!("Failed to delete {}: {}", F::LABEL, err));
                Err(err.into())
            }
        }
    }

    pub fn view(&self) -> DetailView<F, F::Resource> {
        DetailView {
            id: self.id.clone(),
            resource: self.resource.clone(),
            form: self.form.clone(),
            edit_mode: self.edit_mode,
            loading: self.loading,
            error: self.error.clone(),
            notice: self.notice.clone(),
        }
    }
}

impl DetailPage<PractitionerForm> {
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
