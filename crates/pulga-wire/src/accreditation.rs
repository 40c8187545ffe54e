//! Vendor accreditation requests from the wire.

use pulga_core::user::{AccreditationStatus, Applicant, VendorAccreditationRequest};
use serde_json::Value;

use crate::fields::{ENGLISH_FIRST, first_str, first_text};

const ID_KEYS: &[&str] = &["id", "_id"];
const USER_ID_KEYS: &[&str] = &["userId", "user_id"];
const STORE_NAME_KEYS: &[&str] = &["storeName", "store_name", "nombreTienda"];
const CONTACT_KEYS: &[&str] = &["contactNumber", "contact_number", "telefono"];
const COMPANY_RUT_KEYS: &[&str] = &["companyRut", "company_rut", "rutEmpresa"];
const STATUS_KEYS: &[&str] = &["status", "estado"];
const APPLICANT_KEYS: &[&str] = &["applicant", "user", "usuario"];

pub fn map_accreditation_request(raw: &Value) -> VendorAccreditationRequest {
  let Some(obj) = raw.as_object() else {
    return VendorAccreditationRequest::default();
  };
  let text = |keys: &[&str]| first_text(obj, keys).unwrap_or_default();

  let applicant = APPLICANT_KEYS
    .iter()
    .find_map(|k| obj.get(*k).and_then(Value::as_object))
    .map(|a| Applicant {
      name:      first_str(a, ENGLISH_FIRST.name).unwrap_or_default().to_string(),
      last_name: first_str(a, ENGLISH_FIRST.last_name)
        .unwrap_or_default()
        .to_string(),
      email:     first_str(a, ENGLISH_FIRST.email).unwrap_or_default().to_string(),
    });

  VendorAccreditationRequest {
    id: text(ID_KEYS),
    user_id: text(USER_ID_KEYS),
    store_name: text(STORE_NAME_KEYS),
    contact_number: text(CONTACT_KEYS),
    company_rut: text(COMPANY_RUT_KEYS),
    status: AccreditationStatus::from(text(STATUS_KEYS)),
    applicant,
  }
}

/// Map an accreditation list body. Anything but a JSON list yields nothing.
pub fn map_accreditation_requests(raw: &Value) -> Vec<VendorAccreditationRequest> {
  match raw.as_array() {
    Some(rows) => rows.iter().map(map_accreditation_request).collect(),
    None => {
      tracing::debug!("accreditation body is not a list; returning none");
      Vec::new()
    }
  }
}
