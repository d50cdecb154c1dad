//! Configuration document loading
//!
//! Two document shapes are accepted:
//!
//! ```json
//! { "base_uuid": "...", "services": [ { "name": "Lbs", "uuid": "...", "characteristics": [...] } ] }
//! ```
//!
//! and the older array form, where each entry carries its own `base_uuid`
//! and nests the service name/UUID under `service`:
//!
//! ```json
//! [ { "filename": "lbs", "base_uuid": "...", "service": { "name": "Lbs", "uuid": "..." }, "characteristics": [...] } ]
//! ```

use std::fs;
use std::path::Path;

use log::debug;
use serde::Deserialize;

use crate::error::ConfigError;
use crate::model::{Capabilities, Capability, FieldSpec, ReadOptions, ServiceSpec, WriteOptions};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Document {
    Bundle(BundleDoc),
    Legacy(Vec<LegacyEntry>),
}

#[derive(Debug, Deserialize)]
struct BundleDoc {
    base_uuid: String,
    services: Vec<ServiceDoc>,
}

#[derive(Debug, Deserialize)]
struct ServiceDoc {
    name: String,
    uuid: String,
    #[serde(default)]
    base_uuid: Option<String>,
    #[serde(default)]
    filename: Option<String>,
    #[serde(default)]
    file_header_comment: Option<String>,
    #[serde(default)]
    characteristics: Vec<CharacteristicDoc>,
}

#[derive(Debug, Deserialize)]
struct LegacyEntry {
    base_uuid: String,
    service: ServiceRef,
    #[serde(default)]
    filename: Option<String>,
    #[serde(default)]
    file_header_comment: Option<String>,
    #[serde(default)]
    characteristics: Vec<CharacteristicDoc>,
}

#[derive(Debug, Deserialize)]
struct ServiceRef {
    name: String,
    uuid: String,
}

#[derive(Debug, Deserialize)]
struct CharacteristicDoc {
    name: String,
    uuid: String,
    #[serde(default)]
    read: Option<ReadDoc>,
    #[serde(default)]
    write: Option<WriteDoc>,
    #[serde(default)]
    notification: bool,
    #[serde(default)]
    indication: bool,
}

#[derive(Debug, Default, Deserialize)]
struct ReadDoc {
    #[serde(default)]
    enable: bool,
    #[serde(default)]
    length: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
struct WriteDoc {
    #[serde(default)]
    enable: bool,
    #[serde(default)]
    length: Option<u16>,
    #[serde(default)]
    check_length: bool,
    #[serde(default)]
    check_offset: bool,
}

impl CharacteristicDoc {
    fn into_field(self) -> Result<FieldSpec, ConfigError> {
        let declared = [
            self.read.as_ref().and_then(|r| r.length),
            self.write.as_ref().and_then(|w| w.length),
        ];
        if declared.contains(&Some(0)) {
            return Err(ConfigError::ZeroLength { field: self.name });
        }

        let mut caps = Capabilities::none();

        if let Some(read) = self.read.filter(|r| r.enable) {
            caps.set.insert(Capability::Read);
            caps.read = ReadOptions { length: read.length };
        }
        if let Some(write) = self.write.filter(|w| w.enable) {
            caps.set.insert(Capability::Write);
            caps.write = WriteOptions {
                length: write.length,
                check_length: write.check_length,
                check_offset: write.check_offset,
            };
        }
        if self.notification {
            caps.set.insert(Capability::Notify);
        }
        if self.indication {
            caps.set.insert(Capability::Indicate);
        }

        Ok(FieldSpec::new(self.name, self.uuid, caps))
    }
}

fn fields(characteristics: Vec<CharacteristicDoc>) -> Result<Vec<FieldSpec>, ConfigError> {
    characteristics.into_iter().map(CharacteristicDoc::into_field).collect()
}

/// Decode a configuration document into service descriptions
pub fn parse_document(text: &str) -> Result<Vec<ServiceSpec>, ConfigError> {
    let services: Vec<ServiceSpec> = match serde_json::from_str::<Document>(text)? {
        Document::Bundle(doc) => {
            let base = doc.base_uuid;
            doc.services
                .into_iter()
                .map(|svc| -> Result<ServiceSpec, ConfigError> {
                    Ok(ServiceSpec {
                        base_uuid: svc.base_uuid.unwrap_or_else(|| base.clone()),
                        name: svc.name,
                        uuid: svc.uuid,
                        filename: svc.filename,
                        header_comment: svc.file_header_comment,
                        fields: fields(svc.characteristics)?,
                    })
                })
                .collect::<Result<_, _>>()?
        }
        Document::Legacy(entries) => entries
            .into_iter()
            .map(|entry| -> Result<ServiceSpec, ConfigError> {
                Ok(ServiceSpec {
                    name: entry.service.name,
                    uuid: entry.service.uuid,
                    base_uuid: entry.base_uuid,
                    filename: entry.filename,
                    header_comment: entry.file_header_comment,
                    fields: fields(entry.characteristics)?,
                })
            })
            .collect::<Result<_, _>>()?,
    };

    if services.is_empty() {
        return Err(ConfigError::NoServices);
    }

    debug!("decoded {} service(s)", services.len());
    Ok(services)
}

/// Read and decode a configuration file
pub fn load(path: &Path) -> Result<Vec<ServiceSpec>, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    parse_document(&text)
}
