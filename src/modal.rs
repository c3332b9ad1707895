//! Location and contact dialogs of the listing screen.
//!
//! Both dialogs share one selection record. Closing either one hides both and
//! clears the whole record, including fields the other dialog filled in.

use crate::models::Flat;
use serde::{Deserialize, Serialize};

/// Flat and owner targeted by an open dialog
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModalSelection {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub city: String,
    pub street_name: String,
    pub street_number: String,
    pub avatar: String,
    pub email: String,
    pub flat_id: String,
    pub owner_id: String,
    pub viewer_id: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModalState {
    location_visible: bool,
    message_visible: bool,
    selection: ModalSelection,
}

impl ModalState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show the map dialog for `flat`. Other selection fields are kept.
    pub fn open_location(&mut self, flat: &Flat) {
        self.selection.latitude = flat.latitude;
        self.selection.longitude = flat.longitude;
        self.location_visible = true;
    }

    /// Show the contact dialog for `flat`'s owner. Coordinates are kept.
    pub fn open_message(&mut self, flat: &Flat, viewer_id: &str) {
        self.selection.city = flat.city.clone();
        self.selection.street_name = flat.street_name.clone();
        self.selection.street_number = flat.street_number.clone();
        self.selection.avatar = flat.owner.avatar.clone();
        self.selection.email = flat.owner.email.clone();
        self.selection.flat_id = flat.id.clone();
        self.selection.owner_id = flat.owner.id.clone();
        self.selection.viewer_id = viewer_id.to_string();
        self.message_visible = true;
    }

    /// Hide both dialogs and clear the shared selection
    pub fn close(&mut self) {
        self.location_visible = false;
        self.message_visible = false;
        self.selection = ModalSelection::default();
    }

    pub fn is_location_visible(&self) -> bool {
        self.location_visible
    }

    pub fn is_message_visible(&self) -> bool {
        self.message_visible
    }

    pub fn selection(&self) -> &ModalSelection {
        &self.selection
    }

    /// Headline shown by the contact dialog
    pub fn message_headline(&self) -> String {
        format!("{}!", self.selection.email)
    }
}
